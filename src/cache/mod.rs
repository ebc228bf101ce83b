//! Local mirror and remote/local orchestration.
//!
//! This module is entity-agnostic:
//! - Keeps each entity type's collection as one JSON array in a key/value store
//! - Seeds a collection with canonical records on first use
//! - Reroutes operations to the mirror when the backend table is missing
//! - Tracks the current mode per entity type in a shared cell

mod layer;
mod local;
pub mod storage;
mod traits;

pub use layer::FallbackLayer;
pub use local::{Outcome, SharedStorage};
pub use storage::{MemoryStorage, NoopStorage, SqliteStorage};
pub use traits::{Fetched, Mode, ModePolicy, Record};

use std::path::Path;
use std::sync::Arc;

/// Open the durable store shared by every local collection.
///
/// If it cannot be opened, collections are served from seed data and
/// nothing is persisted.
pub fn open_storage(path: Option<&Path>) -> SharedStorage {
  match SqliteStorage::open(path) {
    Ok(storage) => Arc::new(storage),
    Err(e) => {
      tracing::warn!(error = %e, "local store unavailable, changes will not be persisted");
      Arc::new(NoopStorage)
    }
  }
}
