//! Shelter domain: pets, adoption requests, and the repositories serving them.

pub mod repository;
pub mod seed;
#[cfg(test)]
pub mod testing;
pub mod types;
pub mod validate;
pub mod views;

use color_eyre::Result;

use crate::cache::{FallbackLayer, Fetched, Mode, ModePolicy, SharedStorage};
use crate::config::Config;
use crate::error::RemoteError;
use crate::ids;
use crate::query::ListQuery;
use crate::remote::{RemoteTable, RestClient, RestTable};

use repository::{PetRepository, RequestRepository, Repository};
use types::{AdoptionRequest, Pet, RequestFilter, RequestStatus};
use views::{Notifications, PetBreakdown, RequestSummary, RequestWithPet};

/// Entries per list in the notifications feed
const FEED_LIMIT: usize = 8;

/// Breeds reported by [`Shelter::pet_breakdown`]
const TOP_BREEDS: usize = 6;

/// Both repositories, sharing one local store and one id generator.
///
/// Clone it freely; clones share the mode cell of each entity type.
#[derive(Clone)]
pub struct Shelter<P: RemoteTable<Pet>, Q: RemoteTable<AdoptionRequest>> {
  pub pets: PetRepository<P>,
  pub requests: RequestRepository<Q>,
}

impl Shelter<RestTable<Pet>, RestTable<AdoptionRequest>> {
  /// Connect to the configured backend.
  pub fn connect(config: &Config, storage: SharedStorage) -> Result<Self> {
    let client = RestClient::new(&config.backend)?;

    Ok(Self::new(
      client.table(),
      client.table(),
      storage,
      config.mode_policy,
      config.storage.reseed_empty,
    ))
  }
}

impl<P: RemoteTable<Pet>, Q: RemoteTable<AdoptionRequest>> Shelter<P, Q> {
  pub fn new(pets: P, requests: Q, storage: SharedStorage, policy: ModePolicy, reseed_empty: bool) -> Self {
    let ids = ids::default_generator();

    Self {
      pets: Repository::new(
        pets,
        FallbackLayer::new(storage.clone(), policy, reseed_empty),
        ids.clone(),
      ),
      requests: Repository::new(
        requests,
        FallbackLayer::new(storage, policy, reseed_empty),
        ids,
      ),
    }
  }

  /// Requests joined with the names of their pets.
  ///
  /// The mode is that of the requests. Local requests are named from the
  /// local pet mirror without contacting the backend. Remote requests are
  /// named from whichever pet collection is available, which may also be
  /// the local mirror.
  pub async fn requests_with_pets(
    &self,
    query: &ListQuery<RequestFilter>,
  ) -> Result<Fetched<Vec<RequestWithPet>>, RemoteError> {
    let requests = self.requests.list(query).await?;
    if requests.data.is_empty() {
      return Ok(requests.map(|_| Vec::new()));
    }

    let pets = if requests.is_local() {
      self.pets.list_local(&ListQuery::default()).await
    } else {
      self.pets.list(&ListQuery::default()).await?
    };
    Ok(requests.map(|rows| views::attach_pet_names(rows, &pets.data)))
  }

  /// Newest pending requests and newest pets.
  ///
  /// Local when either part was served locally. Once requests are local the
  /// pets come from the local mirror too.
  pub async fn notifications(&self) -> Result<Fetched<Notifications>, RemoteError> {
    let pending_query = ListQuery::filtered(RequestFilter {
      status: Some(RequestStatus::Pending),
      pet_id: None,
    })
    .with_limit(FEED_LIMIT);
    let pending = self.requests_with_pets(&pending_query).await?;

    let recent_query = ListQuery::default().with_limit(FEED_LIMIT);
    let recent = if pending.is_local() {
      self.pets.list_local(&recent_query).await
    } else {
      self.pets.list(&recent_query).await?
    };

    let mode = if pending.is_local() || recent.is_local() {
      Mode::Local
    } else {
      Mode::Remote
    };
    Ok(Fetched {
      data: Notifications {
        pending: pending.data,
        recent_pets: recent.data,
      },
      mode,
    })
  }

  pub async fn request_summary(&self) -> Result<Fetched<RequestSummary>, RemoteError> {
    let requests = self.requests.list(&ListQuery::default()).await?;
    Ok(requests.map(|rows| RequestSummary::tally(&rows)))
  }

  /// Pets per species and the most common breeds.
  pub async fn pet_breakdown(&self) -> Result<Fetched<PetBreakdown>, RemoteError> {
    let pets = self.pets.list(&ListQuery::default()).await?;
    Ok(pets.map(|rows| PetBreakdown {
      species: views::species_breakdown(&rows),
      top_breeds: views::top_breeds(&rows, TOP_BREEDS),
    }))
  }
}
