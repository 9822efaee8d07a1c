//! The value types that flow through the container: resolved instances,
//! recipe arguments, recipes and the closed sets of registration sources and
//! resolution targets.

use crate::error::{IocError, Result};
use crate::signature;
use std::any::{self, Any};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A resolved, type-erased value.
///
/// Cloning an `Instance` clones the handle, not the value, so two clones are
/// always [`ptr_eq`](Instance::ptr_eq).
#[derive(Clone)]
pub struct Instance {
  value: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Instance {
  /// Wraps a value in a new shared handle.
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_arc(Arc::new(value))
  }

  /// Wraps an existing shared handle without re-allocating.
  pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      value,
      type_name: any::type_name::<T>(),
    }
  }

  /// Returns a typed handle to the value, or `None` if it is not a `T`.
  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.value.clone().downcast::<T>().ok()
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.value.downcast_ref::<T>()
  }

  pub fn is<T: Any>(&self) -> bool {
    self.value.is::<T>()
  }

  /// The name of the concrete type this instance was created from.
  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  /// Reference equality: both handles point at the same value.
  pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
    Arc::ptr_eq(&a.value, &b.value)
  }

  pub(crate) fn downcast_named<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    self.downcast::<T>().ok_or_else(|| IocError::TypeMismatch {
      name: name.to_owned(),
      expected: any::type_name::<T>(),
      found: self.type_name,
    })
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Instance({})", self.type_name)
  }
}

/// The resolved arguments handed to a recipe, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
  entries: Vec<(String, Instance)>,
}

impl Arguments {
  pub(crate) fn with_capacity(capacity: usize) -> Self {
    Self {
      entries: Vec::with_capacity(capacity),
    }
  }

  pub(crate) fn push(&mut self, name: String, value: Instance) {
    self.entries.push((name, value));
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// The argument at `index`, downcast to `T`.
  pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
    let (name, value) = self.entries.get(index).ok_or_else(|| IocError::MissingArgument {
      name: format!("#{}", index),
    })?;
    value.downcast_named::<T>(name)
  }

  /// The argument declared as `name`, downcast to `T`.
  pub fn named<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    self
      .instance(name)
      .ok_or_else(|| IocError::MissingArgument {
        name: name.to_owned(),
      })?
      .downcast_named::<T>(name)
  }

  /// The untyped argument declared as `name`.
  pub fn instance(&self, name: &str) -> Option<&Instance> {
    self
      .entries
      .iter()
      .find(|(declared, _)| declared == name)
      .map(|(_, value)| value)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Instance)> {
    self.entries.iter().map(|(name, value)| (name.as_str(), value))
  }
}

/// How a recipe names its dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
  /// The textual parameter list of the callable, parsed on demand.
  Text(Cow<'static, str>),
  /// Dependency names supplied directly; no parsing takes place.
  Explicit(Vec<String>),
}

impl Signature {
  pub fn dependency_names(&self) -> Result<Vec<String>> {
    match self {
      Signature::Text(text) => signature::extract(text),
      Signature::Explicit(names) => Ok(names.clone()),
    }
  }
}

type Invoke = dyn Fn(Arguments) -> Result<Instance> + Send + Sync;

/// A callable the container can invoke with resolved dependencies: a
/// constructor or factory function plus the signature naming its parameters.
#[derive(Clone)]
pub struct Recipe {
  signature: Signature,
  invoke: Arc<Invoke>,
}

impl Recipe {
  /// A recipe whose dependency names are parsed from `text`, e.g.
  /// `"|logger, store|"` or `"fn new(logger: Logger, store: Store)"`.
  ///
  /// The returned value is moved into a new shared handle. A recipe that
  /// returns an `Arc<T>` therefore resolves to an `Arc<Arc<T>>`; use
  /// [`from_signature_shared`](Recipe::from_signature_shared) for those.
  pub fn from_signature<T, F>(text: impl Into<Cow<'static, str>>, f: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(Arguments) -> Result<T> + Send + Sync + 'static,
  {
    Self::new(Signature::Text(text.into()), f)
  }

  /// Like [`from_signature`](Recipe::from_signature), for recipes that hand
  /// back a value already held in an `Arc`, such as one of their arguments.
  /// The handle is stored as is, so the result resolves as a `T`.
  pub fn from_signature_shared<T, F>(text: impl Into<Cow<'static, str>>, f: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(Arguments) -> Result<Arc<T>> + Send + Sync + 'static,
  {
    Self {
      signature: Signature::Text(text.into()),
      invoke: Arc::new(move |args| f(args).map(Instance::from_arc)),
    }
  }

  /// A recipe with an explicit, ordered list of dependency names.
  pub fn with_dependencies<T, F, I, S>(names: I, f: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(Arguments) -> Result<T> + Send + Sync + 'static,
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self::new(
      Signature::Explicit(names.into_iter().map(Into::into).collect()),
      f,
    )
  }

  /// A recipe without dependencies.
  pub fn from_fn<T, F>(f: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    Self::new(Signature::Explicit(Vec::new()), move |_| Ok(f()))
  }

  fn new<T, F>(signature: Signature, f: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(Arguments) -> Result<T> + Send + Sync + 'static,
  {
    Self {
      signature,
      invoke: Arc::new(move |args| f(args).map(Instance::new)),
    }
  }

  pub fn signature(&self) -> &Signature {
    &self.signature
  }

  pub fn dependency_names(&self) -> Result<Vec<String>> {
    self.signature.dependency_names()
  }

  pub fn invoke(&self, args: Arguments) -> Result<Instance> {
    (self.invoke)(args)
  }
}

impl fmt::Debug for Recipe {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Recipe")
      .field("signature", &self.signature)
      .finish_non_exhaustive()
  }
}

/// What a tag is bound to.
#[derive(Debug, Clone)]
pub enum Source {
  /// Invoked with resolved dependencies on every build.
  Callable(Recipe),
  /// Already a finished value.
  Value(Instance),
}

impl Source {
  pub fn value<T: Any + Send + Sync>(value: T) -> Self {
    Source::Value(Instance::new(value))
  }

  pub fn is_callable(&self) -> bool {
    matches!(self, Source::Callable(_))
  }
}

impl From<Recipe> for Source {
  fn from(recipe: Recipe) -> Self {
    Source::Callable(recipe)
  }
}

impl From<Instance> for Source {
  fn from(instance: Instance) -> Self {
    Source::Value(instance)
  }
}

/// What [`Container::make`](crate::Container::make) is asked to build.
#[derive(Debug, Clone)]
pub enum Target {
  /// Resolve a registered tag.
  Tag(String),
  /// Invoke an unregistered recipe with its dependencies resolved.
  Callable(Recipe),
  /// Returned unchanged.
  Value(Instance),
}

impl Target {
  pub fn value<T: Any + Send + Sync>(value: T) -> Self {
    Target::Value(Instance::new(value))
  }

  pub(crate) fn describe(&self) -> Cow<'_, str> {
    match self {
      Target::Tag(tag) => Cow::Borrowed(tag),
      Target::Callable(recipe) => Cow::Owned(format!("{:?}", recipe.signature())),
      Target::Value(instance) => Cow::Borrowed(instance.type_name()),
    }
  }
}

impl From<&str> for Target {
  fn from(tag: &str) -> Self {
    Target::Tag(tag.to_owned())
  }
}

impl From<String> for Target {
  fn from(tag: String) -> Self {
    Target::Tag(tag)
  }
}

impl From<&String> for Target {
  fn from(tag: &String) -> Self {
    Target::Tag(tag.clone())
  }
}

impl From<Recipe> for Target {
  fn from(recipe: Recipe) -> Self {
    Target::Callable(recipe)
  }
}

impl From<Instance> for Target {
  fn from(instance: Instance) -> Self {
    Target::Value(instance)
  }
}
