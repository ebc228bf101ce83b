//! Identifier generation for records created while in local mode.

use chrono::Utc;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use std::sync::Arc;

/// Source of new record identifiers.
pub trait IdGenerator: Send + Sync {
  fn new_id(&self) -> String;
}

/// Random v4 UUIDs backed by the operating system's entropy source.
///
/// Falls back to [`CompositeIds`] for any draw where the entropy source
/// cannot be read.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl UuidIds {
  /// Checks whether the OS entropy source is usable right now.
  pub fn available() -> bool {
    let mut probe = [0u8; 16];
    OsRng.try_fill_bytes(&mut probe).is_ok()
  }

  fn try_new_id(&self) -> Option<String> {
    let mut bytes = [0u8; 16];
    OsRng.try_fill_bytes(&mut bytes).ok()?;
    Some(
      uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string(),
    )
  }
}

impl IdGenerator for UuidIds {
  fn new_id(&self) -> String {
    match self.try_new_id() {
      Some(id) => id,
      None => {
        tracing::warn!("OS entropy unavailable, using composite local id");
        CompositeIds.new_id()
      }
    }
  }
}

/// `local-<unix millis>-<0..100000>` identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompositeIds;

impl IdGenerator for CompositeIds {
  fn new_id(&self) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..100_000);
    format!("local-{}-{}", millis, suffix)
  }
}

/// Picks the strongest generator the runtime supports.
pub fn default_generator() -> Arc<dyn IdGenerator> {
  if UuidIds::available() {
    Arc::new(UuidIds)
  } else {
    tracing::warn!("OS entropy unavailable, local ids use the composite format");
    Arc::new(CompositeIds)
  }
}
