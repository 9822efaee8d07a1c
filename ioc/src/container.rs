//! The main `Container` struct and its associated methods.

use crate::binding::{Binding, BindingBuilder, BuildFn, Policy};
use crate::config::ContainerConfig;
use crate::core::{ResolutionGuard, SingletonTracker};
use crate::error::{IocError, Result};
use crate::value::{Arguments, Instance, Source, Target};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

static NEXT_CONTAINER_ID: AtomicUsize = AtomicUsize::new(1);

struct Registry {
  id: usize,
  config: ContainerConfig,
  bindings: DashMap<String, Arc<Binding>>,
  singletons: SingletonTracker,
}

/// The Inversion of Control (IoC) container.
///
/// Maps string tags to bindings and builds object graphs by resolving each
/// recipe parameter as the tag of the same name. The container is thread-safe;
/// clones share one registry, while separately created containers never see
/// each other's bindings.
#[derive(Clone)]
pub struct Container {
  registry: Arc<Registry>,
}

impl Default for Container {
  fn default() -> Self {
    Self::with_config(ContainerConfig::default())
  }
}

impl Container {
  /// Creates a new container with the default configuration.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_config(config: ContainerConfig) -> Self {
    let container = Self {
      registry: Arc::new(Registry {
        id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
        config,
        bindings: DashMap::new(),
        singletons: SingletonTracker::default(),
      }),
    };

    if let Some(tag) = container.registry.config.self_tag.clone() {
      let policy = Policy {
        weak: true,
        instance: true,
        ..Policy::default()
      };
      let source = Source::value(container.get_factory());
      let binding = Binding::new(tag.clone(), source, policy, container.build_fn());
      container.registry.bindings.insert(tag, Arc::new(binding));
    }

    container
  }

  pub fn config(&self) -> &ContainerConfig {
    &self.registry.config
  }

  // --- Registration ---

  /// Starts registering `source` under `tag`.
  ///
  /// Chain `as_weak`, `as_singleton` or `as_instance` on the returned builder
  /// and finish with `install`.
  ///
  /// ```
  /// use sack::{Container, Recipe, Source};
  ///
  /// let container = Container::new();
  /// container.register("greeting", Source::value("hello")).install()?;
  /// container
  ///   .register("shout", Recipe::from_signature("|greeting|", |args| {
  ///     Ok(args.named::<&str>("greeting")?.to_uppercase())
  ///   }))
  ///   .as_singleton()
  ///   .install()?;
  ///
  /// assert_eq!(*container.make_as::<String>("shout")?, "HELLO");
  /// # Ok::<(), sack::IocError>(())
  /// ```
  pub fn register(&self, tag: impl Into<String>, source: impl Into<Source>) -> BindingBuilder<'_> {
    BindingBuilder::new(self, tag.into(), source.into())
  }

  pub(crate) fn install(&self, tag: String, source: Source, policy: Policy) -> Result<Arc<Binding>> {
    let binding = Arc::new(Binding::new(tag.clone(), source, policy, self.build_fn()));

    match self.registry.bindings.entry(tag) {
      Entry::Occupied(mut occupied) => {
        if !occupied.get().is_weak() {
          debug!(tag = %occupied.key(), "registration rejected, tag is already bound");
          return Err(IocError::RegistrationConflict {
            tag: occupied.key().clone(),
          });
        }
        debug!(tag = %occupied.key(), "replacing weak binding");
        occupied.insert(Arc::clone(&binding));
      }
      Entry::Vacant(vacant) => {
        vacant.insert(Arc::clone(&binding));
      }
    }

    debug!(
      tag = binding.tag(),
      weak = policy.weak,
      singleton = policy.singleton,
      instance = policy.instance,
      "binding installed"
    );
    Ok(binding)
  }

  // The registry owns the bindings, so they only hold it weakly.
  fn build_fn(&self) -> BuildFn {
    let registry = Arc::downgrade(&self.registry);
    Box::new(move |binding: &Binding| {
      let registry = registry.upgrade().ok_or(IocError::ContainerDropped)?;
      registry.construct(binding)
    })
  }

  // --- Resolution ---

  /// Builds `target`.
  ///
  /// - a tag resolves through its binding, failing with
  ///   `UnresolvedDependency` if none is registered;
  /// - a recipe is invoked with each of its parameters resolved as a tag,
  ///   without touching the registry;
  /// - a value is returned unchanged.
  pub fn make(&self, target: impl Into<Target>) -> Result<Instance> {
    self.registry.make(target.into())
  }

  /// Builds `target` and downcasts the result to `T`.
  pub fn make_as<T: Any + Send + Sync>(&self, target: impl Into<Target>) -> Result<Arc<T>> {
    let target = target.into();
    let name = target.describe().into_owned();
    self.registry.make(target)?.downcast_named::<T>(&name)
  }

  /// Like [`make`](Container::make) for tags, but returns `None` instead of
  /// failing when the tag is not registered. Any other target is an
  /// `InvalidArgument`.
  pub fn make_or_null(&self, target: impl Into<Target>) -> Result<Option<Instance>> {
    match target.into() {
      Target::Tag(tag) if !self.tag_exists(&tag) => Ok(None),
      Target::Tag(tag) => self.registry.make(Target::Tag(tag)).map(Some),
      other => Err(IocError::InvalidArgument(format!(
        "make_or_null expects a tag, got `{}`",
        other.describe()
      ))),
    }
  }

  pub fn tag_exists(&self, tag: &str) -> bool {
    self.registry.bindings.contains_key(tag)
  }

  /// Returns a handle that forwards to [`make`](Container::make), for code
  /// that should build things without depending on the container itself.
  pub fn get_factory(&self) -> Factory {
    Factory {
      registry: Arc::downgrade(&self.registry),
    }
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("id", &self.registry.id)
      .field("bindings", &self.registry.bindings.len())
      .finish()
  }
}

impl Registry {
  fn make(&self, target: Target) -> Result<Instance> {
    match target {
      Target::Tag(tag) => self.make_tag(&tag),
      Target::Callable(recipe) => {
        trace!(signature = ?recipe.signature(), "invoking unregistered recipe");
        let names = recipe.dependency_names()?;
        let args = self.resolve_all(&names)?;
        recipe.invoke(args)
      }
      Target::Value(instance) => Ok(instance),
    }
  }

  fn make_tag(&self, tag: &str) -> Result<Instance> {
    let _guard = if self.config.detect_cycles {
      Some(ResolutionGuard::enter(self.id, tag).map_err(|e| {
        debug!(tag, error = %e, "resolution aborted");
        e
      })?)
    } else {
      None
    };

    let binding = self
      .bindings
      .get(tag)
      .map(|entry| Arc::clone(entry.value()))
      .ok_or_else(|| {
        debug!(tag, "unresolved dependency");
        IocError::UnresolvedDependency {
          tag: tag.to_owned(),
        }
      })?;

    trace!(tag, "resolving binding");
    if !self.config.detect_cycles || !binding.is_singleton() || binding.is_built() {
      return binding.build();
    }

    // First build of a singleton: only the claiming thread runs it.
    let _claim = self
      .singletons
      .claim(tag, || binding.is_built())
      .map_err(|e| {
        debug!(tag, error = %e, "singleton build aborted");
        e
      })?;
    binding.build()
  }

  /// Resolves each name as a tag, depth first and in order.
  fn resolve_all(&self, names: &[String]) -> Result<Arguments> {
    let mut args = Arguments::with_capacity(names.len());
    for name in names {
      args.push(name.clone(), self.make_tag(name)?);
    }
    Ok(args)
  }

  fn construct(&self, binding: &Binding) -> Result<Instance> {
    match binding.source() {
      Source::Callable(recipe) => {
        let args = self.resolve_all(binding.dependency_names()?)?;
        recipe.invoke(args)
      }
      Source::Value(instance) => Ok(instance.clone()),
    }
  }
}

/// A single-argument handle onto a container's [`make`](Container::make).
///
/// The factory holds its container weakly; once every `Container` handle is
/// dropped, calls fail with [`IocError::ContainerDropped`].
#[derive(Clone)]
pub struct Factory {
  registry: Weak<Registry>,
}

impl Factory {
  pub fn make(&self, target: impl Into<Target>) -> Result<Instance> {
    let registry = self.registry.upgrade().ok_or(IocError::ContainerDropped)?;
    registry.make(target.into())
  }

  pub fn make_as<T: Any + Send + Sync>(&self, target: impl Into<Target>) -> Result<Arc<T>> {
    let target = target.into();
    let name = target.describe().into_owned();
    self.make(target)?.downcast_named::<T>(&name)
  }

  /// Turns the factory into a plain closure.
  pub fn into_fn(self) -> impl Fn(Target) -> Result<Instance> + Clone + Send + Sync {
    move |target: Target| self.make(target)
  }
}

impl fmt::Debug for Factory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Factory")
      .field("alive", &(self.registry.strong_count() > 0))
      .finish()
  }
}
