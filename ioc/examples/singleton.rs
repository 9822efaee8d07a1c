use sack::{Container, Instance, Recipe};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

fn tracker(counter: &Arc<AtomicUsize>, kind: &'static str) -> Recipe {
  let counter = Arc::clone(counter);
  Recipe::from_fn(move || {
    println!("Creating {} RequestTracker...", kind);
    RequestTracker {
      id: counter.fetch_add(1, Ordering::SeqCst),
    }
  })
}

fn main() -> sack::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let container = Container::new();
  let ids = Arc::new(AtomicUsize::new(0));

  // --- Singleton Registration ---
  // This recipe will only be called ONCE.
  container
    .register("singleton_tracker", tracker(&ids, "SINGLETON"))
    .as_singleton()
    .install()?;

  // --- Transient Registration ---
  // This recipe will be called EVERY time the tag is resolved.
  container
    .register("transient_tracker", tracker(&ids, "TRANSIENT"))
    .install()?;

  println!("--- Resolving Singletons ---");
  let s1 = container.make("singleton_tracker")?;
  let s2 = container.make("singleton_tracker")?;
  let (id1, id2) = (
    s1.downcast_ref::<RequestTracker>().map(|t| t.id),
    s2.downcast_ref::<RequestTracker>().map(|t| t.id),
  );
  println!("Singleton 1 ID: {:?}, Singleton 2 ID: {:?}", id1, id2);
  assert_eq!(id1, Some(0));
  assert_eq!(id2, Some(0));
  assert!(
    Instance::ptr_eq(&s1, &s2),
    "Singleton instances should be identical"
  );
  println!("Singleton instances are the same pointer, as expected.\n");

  println!("--- Resolving Transients ---");
  let t1 = container.make_as::<RequestTracker>("transient_tracker")?;
  let t2 = container.make_as::<RequestTracker>("transient_tracker")?;
  println!("Transient 1 ID: {}, Transient 2 ID: {}", t1.id, t2.id);
  assert_eq!(t1.id, 1);
  assert_eq!(t2.id, 2);
  assert!(
    !Arc::ptr_eq(&t1, &t2),
    "Transient instances should be different"
  );
  println!("Transient instances are different pointers, as expected.");
  Ok(())
}
