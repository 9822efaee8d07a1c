use thiserror::Error;

/// The error type for every fallible container operation.
#[derive(Debug, Error)]
pub enum IocError {
  #[error("Tag '{tag}' is already bound by a non-weak binding")]
  RegistrationConflict { tag: String },

  #[error("Cannot resolve dependency '{tag}'")]
  UnresolvedDependency { tag: String },

  #[error("Failed to parse signature `{source_text}`: {reason}")]
  SignatureParse { source_text: String, reason: String },

  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error("Circular dependency detected: {}", .path.join(" -> "))]
  CircularDependency { path: Vec<String> },

  #[error("Recipe has no argument named '{name}'")]
  MissingArgument { name: String },

  #[error("Dependency '{name}' is a `{found}`, expected `{expected}`")]
  TypeMismatch {
    name: String,
    expected: &'static str,
    found: &'static str,
  },

  #[error("Recipe failed to build: {0}")]
  Build(String),

  #[error("The container behind this factory has been dropped")]
  ContainerDropped,

  #[error("Failed to read configuration file: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),
}

impl IocError {
  /// Shorthand for a recipe-reported construction failure.
  pub fn build(reason: impl Into<String>) -> Self {
    IocError::Build(reason.into())
  }

  pub(crate) fn signature(source_text: &str, reason: impl Into<String>) -> Self {
    IocError::SignatureParse {
      source_text: source_text.to_owned(),
      reason: reason.into(),
    }
  }
}

/// A specialized `Result` type for `sack` operations.
pub type Result<T, E = IocError> = std::result::Result<T, E>;
