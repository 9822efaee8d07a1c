use sack::{injectable, Container, Source};
use std::sync::Arc;

// Tags name roles, not types: whichever `Clock` sits under the `clock` tag is
// the one every recipe asking for `clock` receives.
trait Clock: Send + Sync {
  fn now(&self) -> u64;
}

struct FixedClock(u64);

impl Clock for FixedClock {
  fn now(&self) -> u64 {
    self.0
  }
}

struct AuditTrail {
  clock: Arc<dyn Clock>,
  component: String,
}

impl AuditTrail {
  fn record(&self, event: &str) -> String {
    format!("[{}] {}: {}", self.clock.now(), self.component, event)
  }
}

fn main() -> sack::Result<()> {
  let container = Container::new();

  // --- Registration ---

  // A trait object needs its own `Arc`, so the tag holds an `Arc<dyn Clock>`.
  // Weak: a later registration may replace it.
  let clock: Arc<dyn Clock> = Arc::new(FixedClock(1_700_000_000));
  container
    .register("clock", Source::value(clock))
    .as_weak()
    .install()?;
  container
    .register("component", Source::value(String::from("billing")))
    .install()?;
  container
    .register(
      "audit",
      injectable!(|clock: Arc<dyn Clock>, component: String| AuditTrail {
        clock: (*clock).clone(),
        component: (*component).clone(),
      }),
    )
    .install()?;

  // --- Resolution ---
  let audit = container.make_as::<AuditTrail>("audit")?;
  println!("{}", audit.record("invoice issued"));

  // --- Replacing the weak binding ---
  let frozen: Arc<dyn Clock> = Arc::new(FixedClock(0));
  container.register("clock", Source::value(frozen)).install()?;

  let audit = container.make_as::<AuditTrail>("audit")?;
  println!("{}", audit.record("invoice voided"));
  assert_eq!(audit.record("check"), "[0] billing: check");

  Ok(())
}
