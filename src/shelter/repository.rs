//! Per-entity repositories with transparent local fallback.

use chrono::Utc;
use std::sync::Arc;

use crate::cache::{FallbackLayer, Fetched, Mode, Outcome, Record};
use crate::error::RemoteError;
use crate::ids::{CompositeIds, IdGenerator};
use crate::query::{ListQuery, Order};
use crate::remote::RemoteTable;

use super::types::{AdoptionRequest, Pet};

/// Attempts at drawing an id that is not already in the local collection
const MAX_ID_DRAWS: usize = 16;

/// CRUD facade over one remote table and its local mirror.
///
/// Every operation tries the backend first. When the backend reports the
/// table as missing, the operation is applied to the local mirror instead
/// and the result is tagged [`Mode::Local`].
pub struct Repository<T: Record, R: RemoteTable<T>> {
  remote: Arc<R>,
  layer: FallbackLayer<T>,
  ids: Arc<dyn IdGenerator>,
}

pub type PetRepository<R> = Repository<Pet, R>;
pub type RequestRepository<R> = Repository<AdoptionRequest, R>;

impl<T: Record, R: RemoteTable<T>> Repository<T, R> {
  pub fn new(remote: R, layer: FallbackLayer<T>, ids: Arc<dyn IdGenerator>) -> Self {
    Self {
      remote: Arc::new(remote),
      layer,
      ids,
    }
  }

  /// Mode observed by the most recent call on any handle for this entity.
  pub fn mode(&self) -> Option<Mode> {
    self.layer.mode()
  }

  pub async fn list(&self, query: &ListQuery<T::Filter>) -> Result<Fetched<Vec<T>>, RemoteError> {
    self
      .layer
      .run(
        "list",
        || self.remote.list(query),
        |records| Outcome::read(query.apply(records.clone())),
      )
      .await
  }

  /// List from the local mirror only, seeding it if needed.
  pub async fn list_local(&self, query: &ListQuery<T::Filter>) -> Fetched<Vec<T>> {
    self
      .layer
      .local_only(|records| Outcome::read(query.apply(records.clone())))
      .await
  }

  pub async fn get(&self, id: &str) -> Result<Fetched<Option<T>>, RemoteError> {
    self
      .layer
      .run(
        "get",
        || self.remote.get(id),
        |records| Outcome::read(records.iter().find(|r| r.id() == id).cloned()),
      )
      .await
  }

  pub async fn create(&self, mut draft: T::Draft) -> Result<Fetched<T>, RemoteError> {
    T::prepare_draft(&mut draft);
    let draft = &draft;

    self
      .layer
      .run(
        "create",
        || self.remote.insert(draft),
        |records| {
          let id = self.fresh_id(records);
          let record = T::from_draft(id, draft.clone(), Utc::now());
          records.insert(0, record.clone());
          Order::newest_first().sort(records);
          Outcome::changed(record)
        },
      )
      .await
  }

  /// Apply `patch` to the record with `id`.
  ///
  /// `data` is `None` when no record has this id; nothing is changed then.
  pub async fn update(&self, id: &str, patch: T::Patch) -> Result<Fetched<Option<T>>, RemoteError> {
    let patch = &patch;

    self
      .layer
      .run(
        "update",
        || self.remote.update(id, patch),
        |records| {
          let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
            return Outcome::read(None);
          };
          record.apply_patch(patch.clone(), Utc::now());
          let updated = record.clone();
          Order::newest_first().sort(records);
          Outcome::changed(Some(updated))
        },
      )
      .await
  }

  /// Delete the record with `id`. Deleting an unknown id is not an error.
  pub async fn delete(&self, id: &str) -> Result<Fetched<()>, RemoteError> {
    self
      .layer
      .run(
        "delete",
        || self.remote.delete(id),
        |records| {
          let before = records.len();
          records.retain(|r| r.id() != id);
          if records.len() == before {
            Outcome::read(())
          } else {
            Outcome::changed(())
          }
        },
      )
      .await
  }

  fn fresh_id(&self, records: &[T]) -> String {
    let taken = |id: &str| records.iter().any(|r| r.id() == id);

    for _ in 0..MAX_ID_DRAWS {
      let id = self.ids.new_id();
      if !taken(&id) {
        return id;
      }
      tracing::debug!(id = %id, "generated id already in use, drawing again");
    }

    tracing::warn!(draws = MAX_ID_DRAWS, "id generator keeps colliding, using composite ids");
    loop {
      let id = CompositeIds.new_id();
      if !taken(&id) {
        return id;
      }
    }
  }
}

impl<T: Record, R: RemoteTable<T>> Clone for Repository<T, R> {
  fn clone(&self) -> Self {
    Self {
      remote: Arc::clone(&self.remote),
      layer: self.layer.clone(),
      ids: Arc::clone(&self.ids),
    }
  }
}
