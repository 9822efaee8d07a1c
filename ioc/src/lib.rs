//! # Sack
//!
//! A tag-based, auto-wiring Inversion of Control (IoC) container for Rust.
//!
//! Dependencies are registered under string tags. A recipe declares what it
//! needs purely through the names of its parameters: a recipe written as
//! `|logger, store|` is built with whatever the container resolves for the
//! tags `logger` and `store`, recursively and on demand.
//!
//! ## Core Concepts
//!
//! - **Container**: owns the tag registry and resolves object graphs. Each
//!   container is isolated; there is no global default.
//! - **Binding**: one registered tag and its build policy. Bindings are
//!   configured fluently (`as_weak`, `as_singleton`, `as_instance`) and then
//!   installed.
//! - **Recipe**: a constructor or factory function plus its signature. The
//!   signature is either parsed from text (see [`injectable!`]) or given as an
//!   explicit list of dependency names.
//! - **Instance**: a resolved, type-erased, shared value.
//!
//! ## Quick Start
//!
//! ```
//! use sack::{injectable, Container, Source};
//! use std::sync::Arc;
//!
//! struct Logger {
//!   prefix: String,
//! }
//!
//! struct Greeter {
//!   logger: Arc<Logger>,
//! }
//!
//! impl Greeter {
//!   fn greet(&self, name: &str) -> String {
//!     format!("{} hello, {}", self.logger.prefix, name)
//!   }
//! }
//!
//! fn main() -> sack::Result<()> {
//!   let container = Container::new();
//!
//!   container.register("prefix", Source::value(String::from("[app]"))).install()?;
//!   container
//!     .register("logger", injectable!(|prefix: String| Logger { prefix: (*prefix).clone() }))
//!     .as_singleton()
//!     .install()?;
//!   container
//!     .register("greeter", injectable!(|logger: Logger| Greeter { logger }))
//!     .install()?;
//!
//!   let greeter = container.make_as::<Greeter>("greeter")?;
//!   assert_eq!(greeter.greet("world"), "[app] hello, world");
//!   Ok(())
//! }
//! ```
//!
//! ## Cycles
//!
//! With the default configuration a tag that (transitively) depends on itself
//! fails with [`IocError::CircularDependency`]. This includes singleton cycles
//! whose first builds start on different threads: each thread records the
//! singleton it is building, and a thread about to wait on a build that is
//! itself waiting on it fails instead. Turning
//! [`ContainerConfig::detect_cycles`] off restores plain recursion, which
//! overflows the stack on such a graph, and can deadlock threads racing to
//! build a cyclic set of singletons.

mod binding;
mod config;
mod container;
mod core;
mod error;
mod macros;
pub mod signature;
mod value;

pub use binding::{Binding, BindingBuilder};
pub use config::{ContainerConfig, DEFAULT_SELF_TAG};
pub use container::{Container, Factory};
pub use error::{IocError, Result};
pub use value::{Arguments, Instance, Recipe, Signature, Source, Target};
