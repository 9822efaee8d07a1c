use sack::{Container, Source};

// A function that configures dependencies and runs some logic.
// By accepting a `&Container`, it can be tested with a controlled environment.
fn process_data(container: &Container) -> sack::Result<String> {
  // Register a data source ONLY within this container.
  container
    .register("data", Source::value("test data".to_string()))
    .install()?;

  let data = container.make_as::<String>("data")?;
  Ok(format!("Processed: {}", data.to_uppercase()))
}

fn main() -> sack::Result<()> {
  println!("--- Running with a test container ---");
  let test_container = Container::new();
  let result = process_data(&test_container)?;

  println!("Result: {}", result);
  assert_eq!(result, "Processed: TEST DATA");

  // --- Verify Isolation ---
  // The tag registered in `test_container` does not exist anywhere else.
  let app_container = Container::new();
  assert!(
    !app_container.tag_exists("data"),
    "Dependency should not have leaked into another container!"
  );

  println!("\nVerified that containers are isolated from each other.");
  Ok(())
}
