//! In-memory remote table with scripted failures, for tests.

use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::cache::Record;
use crate::error::RemoteError;
use crate::query::ListQuery;
use crate::remote::classify::is_table_missing;
use crate::remote::RemoteTable;

enum Script<T> {
  /// Every call fails with this message, classified against `table`
  Fail { message: String, table: String },
  /// Calls succeed against these rows
  Rows(Vec<T>),
}

/// Remote table double. Clones share the same script and call counter.
pub struct ScriptedTable<T> {
  script: Arc<Mutex<Script<T>>>,
  calls: Arc<AtomicUsize>,
}

impl<T> Clone for ScriptedTable<T> {
  fn clone(&self) -> Self {
    Self {
      script: Arc::clone(&self.script),
      calls: Arc::clone(&self.calls),
    }
  }
}

impl<T: Record> ScriptedTable<T> {
  pub fn failing(message: &str, table: &str) -> Self {
    Self::from_script(Script::Fail {
      message: message.to_string(),
      table: table.to_string(),
    })
  }

  pub fn with_rows(rows: Vec<T>) -> Self {
    Self::from_script(Script::Rows(rows))
  }

  fn from_script(script: Script<T>) -> Self {
    Self {
      script: Arc::new(Mutex::new(script)),
      calls: Arc::new(AtomicUsize::new(0)),
    }
  }

  /// Switch to succeeding against `rows`, as if the table was provisioned.
  pub fn succeed_with(&self, rows: Vec<T>) {
    *self.script.lock().unwrap() = Script::Rows(rows);
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  fn with_rows_mut<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R, RemoteError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let mut script = self.script.lock().unwrap();
    match &mut *script {
      Script::Fail { message, table } => {
        if is_table_missing(Some(message), table) {
          Err(RemoteError::TableMissing {
            table: table.clone(),
            message: message.clone(),
          })
        } else {
          Err(RemoteError::other(message.clone()))
        }
      }
      Script::Rows(rows) => Ok(f(rows)),
    }
  }
}

impl<T: Record> RemoteTable<T> for ScriptedTable<T> {
  async fn list(&self, query: &ListQuery<T::Filter>) -> Result<Vec<T>, RemoteError> {
    self.with_rows_mut(|rows| query.apply(rows.clone()))
  }

  async fn get(&self, id: &str) -> Result<Option<T>, RemoteError> {
    self.with_rows_mut(|rows| rows.iter().find(|r| r.id() == id).cloned())
  }

  async fn insert(&self, draft: &T::Draft) -> Result<T, RemoteError> {
    self.with_rows_mut(|rows| {
      let record = T::from_draft(format!("remote-{}", rows.len() + 1), draft.clone(), Utc::now());
      rows.push(record.clone());
      record
    })
  }

  async fn update(&self, id: &str, patch: &T::Patch) -> Result<Option<T>, RemoteError> {
    self.with_rows_mut(|rows| {
      let record = rows.iter_mut().find(|r| r.id() == id)?;
      record.apply_patch(patch.clone(), Utc::now());
      Some(record.clone())
    })
  }

  async fn delete(&self, id: &str) -> Result<(), RemoteError> {
    self.with_rows_mut(|rows| rows.retain(|r| r.id() != id))
  }
}
