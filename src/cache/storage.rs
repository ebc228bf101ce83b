//! Key/value storage trait and SQLite implementation.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;

/// Trait for durable key/value backends holding serialized collections.
pub trait KeyValueStore: Send + Sync {
  /// Read the raw value stored under `key`.
  fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

  /// Overwrite the value stored under `key`.
  fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

  /// Whether writes will be kept at all.
  fn is_available(&self) -> bool {
    true
  }
}

/// Storage that keeps nothing.
/// Used when no durable backend can be opened - every read misses.
pub struct NoopStorage;

impl KeyValueStore for NoopStorage {
  fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
    Err(StorageError::Unavailable)
  }

  fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
    Err(StorageError::Unavailable)
  }

  fn is_available(&self) -> bool {
    false
  }
}

/// Process-local storage, lost on exit.
#[derive(Default)]
pub struct MemoryStorage {
  values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl KeyValueStore for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    let values = self
      .values
      .lock()
      .map_err(|e| StorageError::Poisoned(e.to_string()))?;
    Ok(values.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
    let mut values = self
      .values
      .lock()
      .map_err(|e| StorageError::Poisoned(e.to_string()))?;
    values.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

/// SQLite-based key/value storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open (or create) the store at `path`, or at the default location.
  pub fn open(path: Option<&Path>) -> Result<Self, StorageError> {
    let path = match path {
      Some(p) => p.to_path_buf(),
      None => Self::default_path()?,
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(&path)?;
    tracing::debug!(path = %path.display(), "opened local store");

    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;

    Ok(storage)
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf, StorageError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or(StorageError::Unavailable)?;

    Ok(data_dir.join("pawhome").join("cache.db"))
  }

  fn run_migrations(&self) -> Result<(), StorageError> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| StorageError::Poisoned(e.to_string()))?;

    conn.execute_batch(STORE_SCHEMA)?;

    Ok(())
  }
}

/// Schema for the key/value table.
const STORE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS local_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    written_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl KeyValueStore for SqliteStorage {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| StorageError::Poisoned(e.to_string()))?;

    let value = conn
      .query_row(
        "SELECT value FROM local_store WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()?;

    Ok(value)
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| StorageError::Poisoned(e.to_string()))?;

    conn.execute(
      "INSERT OR REPLACE INTO local_store (key, value, written_at)
       VALUES (?, ?, datetime('now'))",
      params![key, value],
    )?;

    Ok(())
  }
}
