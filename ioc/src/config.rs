//! Container configuration, loadable from YAML.

use crate::error::{IocError, Result};
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::Path;

/// The tag a container registers its own [`Factory`](crate::Factory) under.
pub const DEFAULT_SELF_TAG: &str = "container";

/// Options for a [`Container`](crate::Container).
///
/// ```yaml
/// detect_cycles: true
/// self_tag: container   # `~` disables self registration
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContainerConfig {
  /// Fail with `CircularDependency` when a tag is revisited while it is still
  /// being built, on the same thread or through singleton builds running on
  /// other threads. Without it a cyclic graph recurses until the stack
  /// overflows, and threads racing on cyclic singletons can deadlock.
  #[serde(default = "default_detect_cycles")]
  pub detect_cycles: bool,

  /// Tag under which the container registers a weak factory for itself.
  #[serde(default = "default_self_tag")]
  pub self_tag: Option<String>,
}

fn default_detect_cycles() -> bool {
  true
}

fn default_self_tag() -> Option<String> {
  Some(DEFAULT_SELF_TAG.to_owned())
}

impl Default for ContainerConfig {
  fn default() -> Self {
    Self {
      detect_cycles: default_detect_cycles(),
      self_tag: default_self_tag(),
    }
  }
}

impl ContainerConfig {
  pub fn from_yaml_str(yaml: &str) -> Result<Self> {
    serde_yaml::from_str(yaml).map_err(|e| IocError::ConfigParse(e.to_string()))
  }

  pub fn from_file(path: &Path) -> Result<Self> {
    let file = File::open(path)?;
    let reader = io::BufReader::new(file);
    serde_yaml::from_reader(reader).map_err(|e| IocError::ConfigParse(e.to_string()))
  }
}
