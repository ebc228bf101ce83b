//! Fallback layer that chooses between the backend and the local mirror.

use std::future::Future;
use std::sync::Arc;

use crate::error::RemoteError;

use super::local::{LocalStore, Outcome, SharedStorage};
use super::traits::{Fetched, Mode, ModeCell, ModePolicy, Record};

/// Fallback layer for one entity type.
///
/// This layer sits between a repository and its remote table. Calls go to
/// the backend first; a missing-table failure reroutes them to the local
/// mirror. Clones share the same mirror and mode cell.
pub struct FallbackLayer<T: Record> {
  local: Arc<LocalStore<T>>,
  mode: Arc<ModeCell>,
  policy: ModePolicy,
}

impl<T: Record> FallbackLayer<T> {
  /// Create a new layer over the given storage backend.
  pub fn new(storage: SharedStorage, policy: ModePolicy, reseed_empty: bool) -> Self {
    Self {
      local: Arc::new(LocalStore::new(storage, reseed_empty)),
      mode: Arc::new(ModeCell::new()),
      policy,
    }
  }

  /// Mode observed by the most recent call, if any.
  pub fn mode(&self) -> Option<Mode> {
    self.mode.get()
  }

  /// Run `local` against the mirror without contacting the backend.
  ///
  /// The shared mode cell is left as it is.
  pub async fn local_only<R>(&self, local: impl FnOnce(&mut Vec<T>) -> Outcome<R>) -> Fetched<R> {
    Fetched::local(self.local.with_collection(local).await)
  }

  /// Run one operation.
  ///
  /// 1. Under the sticky policy with local mode latched, go straight to local
  /// 2. Otherwise call the backend; success is tagged remote
  /// 3. A missing-table failure runs `local` against the mirror
  /// 4. Any other failure is returned and the mirror is not touched
  pub async fn run<R, F, Fut, L>(&self, op: &'static str, remote: F, local: L) -> Result<Fetched<R>, RemoteError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, RemoteError>>,
    L: FnOnce(&mut Vec<T>) -> Outcome<R>,
  {
    let table = T::table();

    if self.policy == ModePolicy::Sticky && self.mode.is_local() {
      tracing::debug!(table, op, "local mode latched, skipping backend");
      return Ok(Fetched::local(self.local.with_collection(local).await));
    }

    match remote().await {
      Ok(data) => {
        self.mode.set(Mode::Remote);
        Ok(Fetched::remote(data))
      }
      Err(e) if e.is_table_missing() => {
        if !self.mode.is_local() {
          tracing::warn!(table, op, error = %e, "backend table missing, switching to local mode");
        }
        self.mode.set(Mode::Local);
        Ok(Fetched::local(self.local.with_collection(local).await))
      }
      Err(e) => {
        tracing::debug!(table, op, error = %e, "backend call failed");
        Err(e)
      }
    }
  }
}

impl<T: Record> Clone for FallbackLayer<T> {
  fn clone(&self) -> Self {
    Self {
      local: Arc::clone(&self.local),
      mode: Arc::clone(&self.mode),
      policy: self.policy,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::MemoryStorage;
  use crate::shelter::types::Pet;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn missing() -> RemoteError {
    RemoteError::TableMissing {
      table: "public.pets".into(),
      message: "Could not find the table 'public.pets' in the schema cache".into(),
    }
  }

  fn layer(policy: ModePolicy) -> FallbackLayer<Pet> {
    FallbackLayer::new(Arc::new(MemoryStorage::new()), policy, false)
  }

  #[tokio::test]
  async fn test_remote_success_is_tagged_remote() {
    let layer = layer(ModePolicy::Sticky);
    let result = layer
      .run("list", || async { Ok(7usize) }, |pets| Outcome::read(pets.len()))
      .await
      .unwrap();
    assert_eq!(result, Fetched::remote(7));
    assert_eq!(layer.mode(), Some(Mode::Remote));
  }

  #[tokio::test]
  async fn test_missing_table_falls_back() {
    let layer = layer(ModePolicy::Sticky);
    let result = layer
      .run("list", || async { Err(missing()) }, |pets| Outcome::read(pets.len()))
      .await
      .unwrap();
    assert_eq!(result, Fetched::local(5));
    assert_eq!(layer.mode(), Some(Mode::Local));
  }

  #[tokio::test]
  async fn test_other_failure_is_returned() {
    let layer = layer(ModePolicy::Sticky);
    let touched = AtomicUsize::new(0);
    let err = layer
      .run(
        "list",
        || async { Err::<usize, _>(RemoteError::other("permission denied")) },
        |pets| {
          touched.fetch_add(1, Ordering::SeqCst);
          Outcome::read(pets.len())
        },
      )
      .await
      .unwrap_err();
    assert_eq!(err.message(), "permission denied");
    assert_eq!(touched.load(Ordering::SeqCst), 0);
    assert_eq!(layer.mode(), None);
  }

  #[tokio::test]
  async fn test_sticky_policy_skips_backend_after_fallback() {
    let layer = layer(ModePolicy::Sticky);
    let calls = AtomicUsize::new(0);

    for _ in 0..3 {
      let result = layer
        .run(
          "list",
          || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<usize, _>(missing()) }
          },
          |pets| Outcome::read(pets.len()),
        )
        .await
        .unwrap();
      assert!(result.is_local());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Clones share the latched mode
    let other = layer.clone();
    let result = other
      .run("list", || async { Ok(0usize) }, |pets| Outcome::read(pets.len()))
      .await
      .unwrap();
    assert_eq!(result, Fetched::local(5));
  }

  #[tokio::test]
  async fn test_probe_policy_rechecks_backend() {
    let layer = layer(ModePolicy::Probe);

    let result = layer
      .run("list", || async { Err(missing()) }, |pets| Outcome::read(pets.len()))
      .await
      .unwrap();
    assert!(result.is_local());

    let result = layer
      .run("list", || async { Ok(2usize) }, |pets| Outcome::read(pets.len()))
      .await
      .unwrap();
    assert_eq!(result, Fetched::remote(2));
    assert_eq!(layer.mode(), Some(Mode::Remote));
  }

  #[tokio::test]
  async fn test_local_only_leaves_mode_alone() {
    let layer = layer(ModePolicy::Sticky);

    let result = layer.local_only(|pets| Outcome::read(pets.len())).await;
    assert_eq!(result, Fetched::local(5));
    assert_eq!(layer.mode(), None);
  }
}
