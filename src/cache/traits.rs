//! Core traits and types for the local mirror.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

/// Trait for entities that can be served from the backend or the local mirror.
///
/// Implementors describe where they live on both sides and how the local
/// mirror creates, edits and filters them.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Insert payload (no id, no timestamps)
  type Draft: Serialize + Clone + Send + Sync;
  /// Update payload; absent fields are left untouched
  type Patch: Serialize + Clone + Send + Sync;
  /// Equality filters the backend understands
  type Filter: Default + Send + Sync;

  /// Table name on the backend, without schema (e.g. "pets")
  fn table() -> &'static str;

  /// Key holding the whole local collection
  fn storage_key() -> &'static str;

  /// Canonical records used to seed an absent local collection
  fn seed() -> Vec<Self>;

  fn id(&self) -> &str;

  fn created_at(&self) -> DateTime<Utc>;

  fn updated_at(&self) -> DateTime<Utc>;

  /// Fill defaults on a draft before it is sent anywhere.
  fn prepare_draft(_draft: &mut Self::Draft) {}

  /// Build a new record from a draft. `created_at == updated_at == now`.
  fn from_draft(id: String, draft: Self::Draft, now: DateTime<Utc>) -> Self;

  /// Replace mutable fields from the patch. Must keep `id` and `created_at`.
  fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>);

  /// Filter as `(column, value)` equality pairs for the backend.
  fn filter_params(filter: &Self::Filter) -> Vec<(&'static str, String)>;

  /// Filter evaluated in memory with the same meaning as `filter_params`.
  fn matches(&self, filter: &Self::Filter) -> bool;
}

/// Which store answered an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
  /// Served by the remote backend
  Remote,
  /// Served by the local mirror because the backend table is missing
  Local,
}

impl std::fmt::Display for Mode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Mode::Remote => write!(f, "remote"),
      Mode::Local => write!(f, "local"),
    }
  }
}

/// Result of a repository operation, tagged with the store that served it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
  pub data: T,
  pub mode: Mode,
}

impl<T> Fetched<T> {
  pub fn remote(data: T) -> Self {
    Self {
      data,
      mode: Mode::Remote,
    }
  }

  pub fn local(data: T) -> Self {
    Self {
      data,
      mode: Mode::Local,
    }
  }

  pub fn is_local(&self) -> bool {
    self.mode == Mode::Local
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
    Fetched {
      data: f(self.data),
      mode: self.mode,
    }
  }
}

/// How repositories decide between remote and local on each call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModePolicy {
  /// Once a table is found missing, stay local until restart
  #[default]
  Sticky,
  /// Probe the backend on every call
  Probe,
}

const MODE_UNKNOWN: u8 = 0;
const MODE_REMOTE: u8 = 1;
const MODE_LOCAL: u8 = 2;

/// Shared record of the current mode for one entity type.
///
/// Every repository handle for the same entity type holds the same cell, so
/// concurrently running consumers see the same answer.
#[derive(Debug)]
pub struct ModeCell {
  state: AtomicU8,
}

impl Default for ModeCell {
  fn default() -> Self {
    Self::new()
  }
}

impl ModeCell {
  pub fn new() -> Self {
    Self {
      state: AtomicU8::new(MODE_UNKNOWN),
    }
  }

  /// Last observed mode, `None` before the first call completes.
  pub fn get(&self) -> Option<Mode> {
    match self.state.load(Ordering::Acquire) {
      MODE_REMOTE => Some(Mode::Remote),
      MODE_LOCAL => Some(Mode::Local),
      _ => None,
    }
  }

  pub fn set(&self, mode: Mode) {
    let value = match mode {
      Mode::Remote => MODE_REMOTE,
      Mode::Local => MODE_LOCAL,
    };
    self.state.store(value, Ordering::Release);
  }

  pub fn is_local(&self) -> bool {
    self.get() == Some(Mode::Local)
  }

  #[cfg(test)]
  pub fn reset(&self) {
    self.state.store(MODE_UNKNOWN, Ordering::Release);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mode_cell_transitions() {
    let cell = ModeCell::new();
    assert_eq!(cell.get(), None);
    cell.set(Mode::Remote);
    assert_eq!(cell.get(), Some(Mode::Remote));
    cell.set(Mode::Local);
    assert!(cell.is_local());
    cell.reset();
    assert_eq!(cell.get(), None);
  }

  #[test]
  fn test_fetched_map_keeps_mode() {
    let fetched = Fetched::local(vec![1, 2, 3]).map(|v| v.len());
    assert_eq!(fetched, Fetched::local(3));
  }

  #[test]
  fn test_mode_policy_from_yaml() {
    let policy: ModePolicy = serde_yaml::from_str("probe").unwrap();
    assert_eq!(policy, ModePolicy::Probe);
  }
}
