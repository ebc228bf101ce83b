use std::future::Future;

use crate::cache::Record;
use crate::error::RemoteError;
use crate::query::ListQuery;

/// CRUD access to one backend table.
///
/// One round trip per call, no retries. Failures are already classified
/// into [`RemoteError::TableMissing`] or [`RemoteError::Other`].
pub trait RemoteTable<T: Record>: Send + Sync {
  fn list(&self, query: &ListQuery<T::Filter>) -> impl Future<Output = Result<Vec<T>, RemoteError>> + Send;

  /// `Ok(None)` when no row has this id
  fn get(&self, id: &str) -> impl Future<Output = Result<Option<T>, RemoteError>> + Send;

  fn insert(&self, draft: &T::Draft) -> impl Future<Output = Result<T, RemoteError>> + Send;

  /// `Ok(None)` when no row has this id
  fn update(&self, id: &str, patch: &T::Patch) -> impl Future<Output = Result<Option<T>, RemoteError>> + Send;

  fn delete(&self, id: &str) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
