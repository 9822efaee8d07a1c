use sack::{injectable, Container, IocError, Recipe, Source, Target};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

struct Widget;

#[test]
fn test_double_register_is_a_conflict() {
  // Arrange
  let container = Container::new();
  container.register("a", Source::value(1u8)).install().unwrap();

  // Act
  let result = container.register("a", Source::value(2u8)).install();

  // Assert
  match result {
    Err(IocError::RegistrationConflict { tag }) => assert_eq!(tag, "a"),
    other => panic!("expected a registration conflict, got {:?}", other),
  }
  assert_eq!(*container.make_as::<u8>("a").unwrap(), 1);
}

#[test]
fn test_weak_binding_can_be_replaced() {
  // Arrange
  let container = Container::new();
  container
    .register("a", Source::value(1u8))
    .as_weak()
    .install()
    .unwrap();

  // Act
  container.register("a", Source::value(2u8)).install().unwrap();

  // Assert
  assert_eq!(*container.make_as::<u8>("a").unwrap(), 2);
  // The replacement is not weak, so it cannot be replaced in turn.
  assert!(container.register("a", Source::value(3u8)).install().is_err());
}

#[test]
fn test_unknown_tag_cannot_be_resolved() {
  let container = Container::new();

  match container.make("missing") {
    Err(IocError::UnresolvedDependency { tag }) => assert_eq!(tag, "missing"),
    other => panic!("expected an unresolved dependency, got {:?}", other),
  }
}

#[test]
fn test_unresolved_deep_dependency_fails_the_whole_graph() {
  // Arrange
  let container = Container::new();
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&calls);
  container
    .register("middle", Recipe::from_signature("|missing|", |_| Ok(Widget)))
    .install()
    .unwrap();
  container
    .register(
      "top",
      Recipe::from_signature("|middle|", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Widget)
      }),
    )
    .as_singleton()
    .install()
    .unwrap();

  // Act
  let first = container.make("top");
  container.register("missing", Source::value(0u8)).install().unwrap();
  let second = container.make("top");

  // Assert: nothing was built or cached by the failed attempt.
  assert!(matches!(first, Err(IocError::UnresolvedDependency { ref tag }) if tag == "missing"));
  assert!(second.is_ok());
  assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unparseable_signature_is_reported_on_make() {
  // Arrange: extraction is lazy, so installing succeeds.
  let container = Container::new();
  container
    .register("bad", Recipe::from_signature("|(a, b): (u8, u8)|", |_| Ok(Widget)))
    .install()
    .unwrap();

  // Act
  let result = container.make("bad");

  // Assert
  match result {
    Err(IocError::SignatureParse { source_text, .. }) => {
      assert_eq!(source_text, "|(a, b): (u8, u8)|")
    }
    other => panic!("expected a signature error, got {:?}", other),
  }
}

#[test]
fn test_circular_dependency_is_detected() {
  // Arrange
  let container = Container::new();
  container
    .register("a", Recipe::from_signature("|b|", |_| Ok(Widget)))
    .install()
    .unwrap();
  container
    .register("b", Recipe::from_signature("|c|", |_| Ok(Widget)))
    .install()
    .unwrap();
  container
    .register("c", Recipe::from_signature("|a|", |_| Ok(Widget)))
    .install()
    .unwrap();

  // Act & Assert: repeated attempts report the same cycle, so the
  // resolution stack was unwound after the first failure.
  for _ in 0..2 {
    match container.make("a") {
      Err(IocError::CircularDependency { path }) => assert_eq!(path, ["a", "b", "c", "a"]),
      other => panic!("expected a circular dependency, got {:?}", other),
    }
  }
}

#[test]
fn test_self_dependent_singleton_fails_instead_of_deadlocking() {
  // Arrange
  let container = Container::new();
  container
    .register("s", Recipe::from_signature("|s|", |_| Ok(Widget)))
    .as_singleton()
    .install()
    .unwrap();

  // Act
  let result = container.make("s");

  // Assert
  assert!(matches!(result, Err(IocError::CircularDependency { .. })));
}

#[test]
fn test_make_or_null_rejects_non_tags() {
  let container = Container::new();

  assert!(matches!(
    container.make_or_null(Target::value(1u8)),
    Err(IocError::InvalidArgument(_))
  ));
  assert!(matches!(
    container.make_or_null(Recipe::from_fn(|| Widget)),
    Err(IocError::InvalidArgument(_))
  ));
}

#[test]
fn test_make_or_null_still_propagates_build_errors() {
  // Arrange
  let container = Container::new();
  container
    .register("broken", Recipe::from_signature("|missing|", |_| Ok(Widget)))
    .install()
    .unwrap();

  // Act & Assert
  assert!(matches!(
    container.make_or_null("broken"),
    Err(IocError::UnresolvedDependency { .. })
  ));
}

#[test]
fn test_downcast_to_the_wrong_type_is_a_mismatch() {
  // Arrange
  let container = Container::new();
  container.register("n", Source::value(5u8)).install().unwrap();

  // Act
  let result = container.make_as::<String>("n");

  // Assert
  match result {
    Err(IocError::TypeMismatch { name, found, .. }) => {
      assert_eq!(name, "n");
      assert_eq!(found, "u8");
    }
    other => panic!("expected a type mismatch, got {:?}", other.map(|_| ())),
  }
}

#[test]
fn test_recipe_errors_propagate_unmodified() {
  // Arrange
  let container = Container::new();
  container.register("n", Source::value(5u8)).install().unwrap();
  container
    .register("wrong_type", injectable!(|n: String| n.len()))
    .install()
    .unwrap();
  container
    .register(
      "wrong_name",
      Recipe::with_dependencies(["n"], |args| args.named::<u8>("m").map(|n| *n)),
    )
    .install()
    .unwrap();
  container
    .register(
      "refuses",
      injectable!(fallible |n: u8| Err::<u8, _>(IocError::build(format!("{} is too small", n)))),
    )
    .install()
    .unwrap();

  // Act & Assert
  assert!(matches!(
    container.make("wrong_type"),
    Err(IocError::TypeMismatch { ref name, .. }) if name == "n"
  ));
  assert!(matches!(
    container.make("wrong_name"),
    Err(IocError::MissingArgument { ref name }) if name == "m"
  ));
  match container.make("refuses") {
    Err(IocError::Build(reason)) => assert_eq!(reason, "5 is too small"),
    other => panic!("expected a build error, got {:?}", other),
  }
}
