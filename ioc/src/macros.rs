//! Public macros for declaring recipes.

/// Builds a [`Recipe`](crate::Recipe) from a closure whose parameter names are
/// the tags it depends on.
///
/// Each parameter is annotated with the type it resolves to and arrives in the
/// body as an `Arc` of that type. The parameter list is handed to the
/// signature extractor, so the names the container resolves are exactly the
/// names written in the closure.
///
/// The `fallible` form expects the body to evaluate to a `sack::Result<T>`.
/// The `shared` form expects an `Arc<T>` and stores it without wrapping it
/// again, which lets a recipe pass one of its arguments through as a `T`.
///
/// # Examples
///
/// ```
/// use sack::{injectable, Container, Source};
/// use std::sync::Arc;
///
/// struct Store {
///   url: String,
/// }
///
/// struct Service {
///   store: Arc<Store>,
/// }
///
/// let container = Container::new();
/// container
///   .register("url", Source::value(String::from("sqlite::memory:")))
///   .install()?;
/// container
///   .register("store", injectable!(|url: String| Store { url: (*url).clone() }))
///   .as_singleton()
///   .install()?;
///
/// let service = container.make_as::<Service>(injectable!(|store: Store| Service { store }))?;
/// assert_eq!(service.store.url, "sqlite::memory:");
/// # Ok::<(), sack::IocError>(())
/// ```
#[macro_export]
macro_rules! injectable {
  // Fallible body: injectable!(fallible |a: A| make(a))
  (fallible | $($name:ident : $ty:ty),* $(,)? | $body:expr) => {
    $crate::Recipe::from_signature(
      stringify!(|$($name : $ty),*|),
      move |__args: $crate::Arguments| {
        $( let $name: ::std::sync::Arc<$ty> = __args.named::<$ty>(stringify!($name))?; )*
        $body
      },
    )
  };

  // Infallible body: injectable!(|a: A, b: B| Thing::new(a, b))
  (| $($name:ident : $ty:ty),* $(,)? | $body:expr) => {
    $crate::Recipe::from_signature(
      stringify!(|$($name : $ty),*|),
      move |__args: $crate::Arguments| {
        $( let $name: ::std::sync::Arc<$ty> = __args.named::<$ty>(stringify!($name))?; )*
        ::std::result::Result::Ok::<_, $crate::IocError>($body)
      },
    )
  };

  // Shared body: injectable!(shared |a: A| a)
  (shared | $($name:ident : $ty:ty),* $(,)? | $body:expr) => {
    $crate::Recipe::from_signature_shared(
      stringify!(|$($name : $ty),*|),
      move |__args: $crate::Arguments| {
        $( let $name: ::std::sync::Arc<$ty> = __args.named::<$ty>(stringify!($name))?; )*
        ::std::result::Result::Ok::<_, $crate::IocError>($body)
      },
    )
  };

  // Zero parameters are written `||`, which is a single token.
  (fallible || $body:expr) => {
    $crate::injectable!(fallible | | $body)
  };

  (|| $body:expr) => {
    $crate::injectable!(| | $body)
  };
}
