//! A registered dependency: its source, build policy and caches.

use crate::container::Container;
use crate::error::Result;
use crate::value::{Instance, Source};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// The build function a container injects into each binding it creates.
pub(crate) type BuildFn = Box<dyn Fn(&Binding) -> Result<Instance> + Send + Sync>;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Policy {
  pub(crate) weak: bool,
  pub(crate) singleton: bool,
  pub(crate) instance: bool,
}

/// One registered dependency.
///
/// A binding is immutable once installed, apart from two write-once caches:
/// its dependency names and, for singletons, its built instance.
pub struct Binding {
  tag: String,
  source: Source,
  policy: Policy,
  dependency_names: OnceCell<Vec<String>>,
  cache: OnceCell<Instance>,
  build_fn: BuildFn,
}

impl Binding {
  pub(crate) fn new(tag: String, source: Source, policy: Policy, build_fn: BuildFn) -> Self {
    // Values and direct instances resolve to themselves from the start.
    let cache = match (&source, policy.instance) {
      (Source::Value(value), _) => OnceCell::with_value(value.clone()),
      (Source::Callable(recipe), true) => OnceCell::with_value(Instance::new(recipe.clone())),
      (Source::Callable(_), false) => OnceCell::new(),
    };

    Self {
      tag,
      source,
      policy,
      dependency_names: OnceCell::new(),
      cache,
      build_fn,
    }
  }

  pub fn tag(&self) -> &str {
    &self.tag
  }

  pub fn source(&self) -> &Source {
    &self.source
  }

  /// Whether a later registration under the same tag may replace this one.
  pub fn is_weak(&self) -> bool {
    self.policy.weak
  }

  pub fn is_singleton(&self) -> bool {
    self.policy.singleton
  }

  pub fn is_instance(&self) -> bool {
    self.policy.instance
  }

  pub(crate) fn is_built(&self) -> bool {
    self.cache.get().is_some()
  }

  /// The tags this binding's source depends on, in declaration order.
  ///
  /// Computed once and memoized. Value sources have no dependencies and
  /// never reach the signature extractor.
  pub fn dependency_names(&self) -> Result<&[String]> {
    self
      .dependency_names
      .get_or_try_init(|| match &self.source {
        Source::Callable(recipe) => recipe.dependency_names(),
        Source::Value(_) => Ok(Vec::new()),
      })
      .map(Vec::as_slice)
  }

  /// Produces this binding's value.
  ///
  /// A populated cache is returned as is. Otherwise the injected build
  /// function runs; singletons store its result, and concurrent first builds
  /// of a singleton run the build function only once. A failed build leaves
  /// the cache empty.
  pub fn build(&self) -> Result<Instance> {
    if let Some(cached) = self.cache.get() {
      return Ok(cached.clone());
    }

    if self.policy.singleton {
      return self.cache.get_or_try_init(|| (self.build_fn)(self)).cloned();
    }

    (self.build_fn)(self)
  }
}

impl fmt::Debug for Binding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Binding")
      .field("tag", &self.tag)
      .field("source", &self.source)
      .field("weak", &self.policy.weak)
      .field("singleton", &self.policy.singleton)
      .field("cached", &self.cache.get().is_some())
      .finish()
  }
}

/// Configures a binding before it is installed.
///
/// Returned by [`Container::register`]. Nothing is registered until
/// [`install`](BindingBuilder::install) hands the builder back to the
/// container, after which the binding can no longer be reconfigured.
#[must_use = "a binding is only registered once `install` is called"]
pub struct BindingBuilder<'c> {
  container: &'c Container,
  tag: String,
  source: Source,
  policy: Policy,
}

impl<'c> BindingBuilder<'c> {
  pub(crate) fn new(container: &'c Container, tag: String, source: Source) -> Self {
    Self {
      container,
      tag,
      source,
      policy: Policy::default(),
    }
  }

  /// Allows a later registration under the same tag to replace this binding.
  pub fn as_weak(mut self) -> Self {
    self.policy.weak = true;
    self
  }

  /// Caches the first built instance and returns it for every later resolution.
  pub fn as_singleton(mut self) -> Self {
    self.policy.singleton = true;
    self
  }

  /// Resolves the tag to the source itself. A callable source is returned as
  /// its [`Recipe`](crate::Recipe) and never invoked.
  pub fn as_instance(mut self) -> Self {
    self.policy.instance = true;
    self
  }

  /// Registers the binding.
  ///
  /// Fails with [`IocError::RegistrationConflict`](crate::IocError::RegistrationConflict)
  /// if the tag is already held by a binding that is not weak.
  pub fn install(self) -> Result<Arc<Binding>> {
    self.container.install(self.tag, self.source, self.policy)
  }
}
