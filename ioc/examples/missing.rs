use sack::{Container, IocError, Recipe};

struct Report;

fn main() {
  let container = Container::new();
  container
    .register("report", Recipe::from_signature("fn new(database)", |_| Ok(Report)))
    .install()
    .expect("`report` is registered once");

  // --- Using the failing `make()` ---
  println!("Attempting to build a service whose dependency was never registered...");

  match container.make("report") {
    Err(IocError::UnresolvedDependency { tag }) => {
      println!("Correctly failed: '{}' is not registered.", tag)
    }
    other => panic!("Should not have built the service: {:?}", other),
  }

  // --- Using `make_or_null()` ---
  println!("\nNow, probing an unknown tag with `make_or_null()`...");

  match container.make_or_null("database") {
    Ok(None) => println!("Correctly received `None` for the missing tag."),
    other => panic!("Should not have found the tag: {:?}", other),
  }
}
