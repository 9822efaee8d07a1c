//! Core, non-public data structures for the IoC container.

use crate::error::{IocError, Result};
use parking_lot::{Condvar, Mutex};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::thread::{self, ThreadId};

thread_local! {
  // The tags currently being resolved on this thread, outermost first.
  static RESOLVING_STACK: RefCell<Vec<ResolutionKey>> = const { RefCell::new(Vec::new()) };
}

/// A tag scoped to the container resolving it. Two containers may use the
/// same tag without tripping each other's cycle detection.
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) struct ResolutionKey {
  pub(crate) container_id: usize,
  pub(crate) tag: String,
}

impl fmt::Debug for ResolutionKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Key(Container({}), Tag({}))", self.container_id, self.tag)
  }
}

/// An RAII guard to detect circular dependencies.
///
/// Entering pushes the key onto the thread-local resolution stack, or fails
/// with [`IocError::CircularDependency`] if the key is already on it. Dropping
/// the guard pops the key again, on success and error paths alike.
pub(crate) struct ResolutionGuard {
  key: ResolutionKey,
}

impl ResolutionGuard {
  pub(crate) fn enter(container_id: usize, tag: &str) -> Result<Self> {
    let key = ResolutionKey {
      container_id,
      tag: tag.to_owned(),
    };

    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(start) = stack.iter().position(|entry| *entry == key) {
        let mut path: Vec<String> = stack[start..]
          .iter()
          .filter(|entry| entry.container_id == container_id)
          .map(|entry| entry.tag.clone())
          .collect();
        path.push(key.tag.clone());
        return Err(IocError::CircularDependency { path });
      }
      stack.push(key.clone());
      Ok(())
    })?;

    Ok(Self { key })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(at) = stack.iter().rposition(|entry| *entry == self.key) {
        stack.remove(at);
      }
    });
  }
}

// --- Singleton Ownership ---

#[derive(Default)]
struct BuildState {
  // Singleton tag -> the thread running its first build.
  owners: HashMap<String, ThreadId>,
  // Blocked thread -> the singleton tag it is waiting for.
  waiting: HashMap<ThreadId, String>,
}

impl BuildState {
  /// Follows the wait-for chain from `owner`. Returns the cycle as a tag path
  /// if it leads back to `me`.
  fn wait_cycle(&self, tag: &str, owner: ThreadId, me: ThreadId) -> Option<Vec<String>> {
    let mut path = vec![tag.to_owned()];
    let mut holder = owner;
    for _ in 0..=self.waiting.len() {
      if holder == me {
        let closing = path.last().cloned()?;
        path.insert(0, closing);
        return Some(path);
      }
      let next = self.waiting.get(&holder)?;
      path.push(next.clone());
      holder = *self.owners.get(next)?;
    }
    None
  }
}

/// Coordinates the first builds of a container's singletons across threads.
///
/// Only one thread builds a given singleton; the others wait here instead of
/// inside the binding's cell. Before waiting, a thread checks whether the
/// owner is (transitively) waiting on a singleton it is building itself. Such
/// a cycle fails with [`IocError::CircularDependency`] instead of blocking
/// both threads forever.
#[derive(Default)]
pub(crate) struct SingletonTracker {
  state: Mutex<BuildState>,
  released: Condvar,
}

impl SingletonTracker {
  /// Claims the first build of `tag` for the current thread.
  ///
  /// Returns `None` once `is_built` reports that another thread finished the
  /// build while this one waited.
  pub(crate) fn claim(&self, tag: &str, is_built: impl Fn() -> bool) -> Result<Option<BuildClaim<'_>>> {
    let me = thread::current().id();
    let mut state = self.state.lock();

    loop {
      if is_built() {
        return Ok(None);
      }

      let owner = match state.owners.get(tag).copied() {
        Some(owner) => owner,
        None => {
          state.owners.insert(tag.to_owned(), me);
          return Ok(Some(BuildClaim {
            tracker: self,
            tag: tag.to_owned(),
          }));
        }
      };

      if let Some(path) = state.wait_cycle(tag, owner, me) {
        return Err(IocError::CircularDependency { path });
      }

      state.waiting.insert(me, tag.to_owned());
      self.released.wait(&mut state);
      state.waiting.remove(&me);
    }
  }
}

/// Ownership of one singleton's first build. Dropping it wakes the waiters,
/// whether the build succeeded or not.
pub(crate) struct BuildClaim<'t> {
  tracker: &'t SingletonTracker,
  tag: String,
}

impl Drop for BuildClaim<'_> {
  fn drop(&mut self) {
    self.tracker.state.lock().owners.remove(&self.tag);
    self.tracker.released.notify_all();
  }
}
