//! Whole-collection local mirror with first-use seeding.

use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::StorageError;

use super::storage::KeyValueStore;
use super::traits::Record;

/// Shared handle to the key/value backend behind every local collection.
pub type SharedStorage = Arc<dyn KeyValueStore>;

/// Result of a closure run against a local collection.
pub struct Outcome<R> {
  pub value: R,
  /// Whether the collection was modified and must be written back
  pub changed: bool,
}

impl<R> Outcome<R> {
  pub fn read(value: R) -> Self {
    Self {
      value,
      changed: false,
    }
  }

  pub fn changed(value: R) -> Self {
    Self {
      value,
      changed: true,
    }
  }
}

/// The local copy of one entity type, stored as a single JSON array.
pub struct LocalStore<T: Record> {
  storage: SharedStorage,
  /// Replace a persisted empty collection with the seed on load
  reseed_empty: bool,
  /// Serializes load -> mutate -> save on this collection
  write_lock: Mutex<()>,
  _marker: PhantomData<fn() -> T>,
}

impl<T: Record> LocalStore<T> {
  pub fn new(storage: SharedStorage, reseed_empty: bool) -> Self {
    Self {
      storage,
      reseed_empty,
      write_lock: Mutex::new(()),
      _marker: PhantomData,
    }
  }

  /// Load the collection, seeding it when nothing usable is persisted.
  pub fn load(&self) -> Vec<T> {
    let key = T::storage_key();

    if !self.storage.is_available() {
      return T::seed();
    }

    let raw = match self.storage.get(key) {
      Ok(raw) => raw,
      Err(e) => {
        tracing::warn!(key, error = %e, "local store unreadable, serving seed data");
        return T::seed();
      }
    };

    match raw.map(|r| serde_json::from_str::<Vec<T>>(&r)) {
      Some(Ok(records)) if records.is_empty() && self.reseed_empty => {
        tracing::debug!(key, "local collection empty, reseeding");
        self.seed()
      }
      Some(Ok(records)) => records,
      Some(Err(e)) => {
        tracing::warn!(key, error = %e, "local collection corrupted, reseeding");
        self.seed()
      }
      None => {
        tracing::info!(key, "seeding local collection");
        self.seed()
      }
    }
  }

  /// Persist the full collection, overwriting prior state.
  pub fn save(&self, records: &[T]) {
    let key = T::storage_key();

    if !self.storage.is_available() {
      return;
    }

    if let Err(e) = self.write(key, records) {
      tracing::warn!(key, error = %e, "failed to persist local collection");
    }
  }

  fn write(&self, key: &str, records: &[T]) -> Result<(), StorageError> {
    let raw = serde_json::to_string(records)?;
    self.storage.set(key, &raw)
  }

  /// Run `f` against the loaded collection, saving it afterwards if it changed.
  ///
  /// No other call on this store can load or save in between.
  pub async fn with_collection<R>(&self, f: impl FnOnce(&mut Vec<T>) -> Outcome<R>) -> R {
    let _guard = self.write_lock.lock().await;

    let mut records = self.load();
    let outcome = f(&mut records);
    if outcome.changed {
      self.save(&records);
    }
    outcome.value
  }

  fn seed(&self) -> Vec<T> {
    let seed = T::seed();
    self.save(&seed);
    seed
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::{MemoryStorage, NoopStorage};
  use crate::error::StorageError;
  use crate::shelter::types::{AdoptionRequest, Pet};
  use std::sync::atomic::{AtomicUsize, Ordering};

  /// Memory storage that counts writes.
  #[derive(Default)]
  struct CountingStorage {
    inner: MemoryStorage,
    writes: AtomicUsize,
  }

  impl KeyValueStore for CountingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
      self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
      self.writes.fetch_add(1, Ordering::SeqCst);
      self.inner.set(key, value)
    }
  }

  fn counting() -> Arc<CountingStorage> {
    Arc::new(CountingStorage::default())
  }

  #[test]
  fn test_first_load_persists_seed() {
    let storage = counting();
    let store: LocalStore<Pet> = LocalStore::new(storage.clone(), false);

    let pets = store.load();
    assert_eq!(pets.len(), 5);
    assert_eq!(pets[0].name, "Max");
    assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
    assert!(storage.get("pawhome_demo_pets").unwrap().is_some());
  }

  #[test]
  fn test_seeding_is_idempotent() {
    let storage = counting();
    let store: LocalStore<AdoptionRequest> = LocalStore::new(storage.clone(), false);

    let first = store.load();
    let second = store.load();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_existing_collection_returned_verbatim() {
    let storage = counting();
    let store: LocalStore<Pet> = LocalStore::new(storage.clone(), false);

    let mut pets = store.load();
    pets.truncate(2);
    store.save(&pets);

    assert_eq!(store.load(), pets);
  }

  #[test]
  fn test_corrupted_collection_is_reseeded() {
    let storage = counting();
    storage.set("pawhome_demo_pets", "{not json").unwrap();
    let store: LocalStore<Pet> = LocalStore::new(storage.clone(), false);

    let pets = store.load();
    assert_eq!(pets.len(), 5);
    let persisted = storage.get("pawhome_demo_pets").unwrap().unwrap();
    assert!(serde_json::from_str::<Vec<Pet>>(&persisted).is_ok());
  }

  #[test]
  fn test_empty_collection_is_kept_by_default() {
    let storage = counting();
    let store: LocalStore<Pet> = LocalStore::new(storage.clone(), false);

    store.save(&[]);
    assert!(store.load().is_empty());
  }

  #[test]
  fn test_empty_collection_reseeded_when_configured() {
    let storage = counting();
    let store: LocalStore<Pet> = LocalStore::new(storage.clone(), true);

    store.save(&[]);
    assert_eq!(store.load().len(), 5);
    assert_eq!(store.load().len(), 5);
  }

  #[test]
  fn test_unavailable_storage_serves_seed_in_memory() {
    let store: LocalStore<Pet> = LocalStore::new(Arc::new(NoopStorage), false);

    let mut pets = store.load();
    assert_eq!(pets.len(), 5);

    pets.clear();
    store.save(&pets);
    assert_eq!(store.load().len(), 5);
  }

  #[tokio::test]
  async fn test_with_collection_saves_only_changes() {
    let storage = counting();
    let store: LocalStore<Pet> = LocalStore::new(storage.clone(), false);

    let count = store.with_collection(|pets| Outcome::read(pets.len())).await;
    assert_eq!(count, 5);
    assert_eq!(storage.writes.load(Ordering::SeqCst), 1);

    store
      .with_collection(|pets| {
        pets.pop();
        Outcome::changed(())
      })
      .await;
    assert_eq!(storage.writes.load(Ordering::SeqCst), 2);
    assert_eq!(store.load().len(), 4);
  }
}
