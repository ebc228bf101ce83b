//! Error types for the data-access layer.
//!
//! The binary boundary uses `color_eyre`; everything underneath reports
//! one of these typed errors so callers can tell a missing table from any
//! other backend failure without re-parsing messages.

use thiserror::Error;

/// Failure reported by the remote backend adapter.
///
/// Classification happens once, when the adapter turns a failed response
/// into this type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
  /// The backend reports that the entity's table does not exist
  #[error("table {table} is not provisioned on the backend: {message}")]
  TableMissing { table: String, message: String },

  /// Any other failure (permissions, network, malformed query, ...)
  #[error("{message}")]
  Other { message: String },
}

impl RemoteError {
  pub fn other(message: impl Into<String>) -> Self {
    Self::Other {
      message: message.into(),
    }
  }

  pub fn is_table_missing(&self) -> bool {
    matches!(self, Self::TableMissing { .. })
  }

  /// The human-readable message exactly as the backend produced it.
  pub fn message(&self) -> &str {
    match self {
      Self::TableMissing { message, .. } | Self::Other { message } => message,
    }
  }
}

impl From<reqwest::Error> for RemoteError {
  fn from(e: reqwest::Error) -> Self {
    Self::other(e.to_string())
  }
}

/// Failure of the local key/value persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
  #[error("storage is unavailable")]
  Unavailable,

  #[error("lock poisoned: {0}")]
  Poisoned(String),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

/// A form value rejected before any store is contacted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
  #[error("{field} is required.")]
  Required { field: &'static str },

  #[error("Age in months must be a valid positive number.")]
  InvalidAge,

  #[error("Weight must be a valid positive number.")]
  InvalidWeight,

  #[error("Email address is not valid.")]
  InvalidEmail,
}
