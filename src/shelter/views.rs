//! Derived views computed by consumers over whatever collection came back.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::types::{AdoptionRequest, Pet, RequestStatus, Species};

/// Species chip plus free-text search over name and breed.
pub fn search_pets<'a>(pets: &'a [Pet], species: Option<Species>, text: &str) -> Vec<&'a Pet> {
  let needle = text.trim().to_lowercase();

  pets
    .iter()
    .filter(|pet| species.map_or(true, |s| pet.species == s))
    .filter(|pet| {
      needle.is_empty()
        || pet.name.to_lowercase().contains(&needle)
        || pet
          .breed
          .as_deref()
          .is_some_and(|b| b.to_lowercase().contains(&needle))
    })
    .collect()
}

/// A request with the name of the pet it refers to, when known
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestWithPet {
  #[serde(flatten)]
  pub request: AdoptionRequest,
  pub pet_name: Option<String>,
}

pub fn attach_pet_names(requests: Vec<AdoptionRequest>, pets: &[Pet]) -> Vec<RequestWithPet> {
  let names: HashMap<&str, &str> = pets
    .iter()
    .map(|p| (p.id.as_str(), p.name.as_str()))
    .collect();

  requests
    .into_iter()
    .map(|request| {
      let pet_name = names.get(request.pet_id.as_str()).map(|n| n.to_string());
      RequestWithPet { request, pet_name }
    })
    .collect()
}

/// Request counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestSummary {
  pub total: usize,
  pub pending: usize,
  pub approved: usize,
  pub rejected: usize,
}

impl RequestSummary {
  pub fn tally(requests: &[AdoptionRequest]) -> Self {
    requests.iter().fold(Self::default(), |mut summary, request| {
      summary.total += 1;
      match request.status {
        RequestStatus::Pending => summary.pending += 1,
        RequestStatus::Approved => summary.approved += 1,
        RequestStatus::Rejected => summary.rejected += 1,
      }
      summary
    })
  }
}

/// Pet count per species, every species present (possibly zero)
pub fn species_breakdown(pets: &[Pet]) -> BTreeMap<&'static str, usize> {
  let mut counts: BTreeMap<&'static str, usize> = Species::ALL.iter().map(|s| (s.as_str(), 0)).collect();
  for pet in pets {
    *counts.entry(pet.species.as_str()).or_default() += 1;
  }
  counts
}

/// How many pets share one breed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreedCount {
  pub breed: String,
  pub count: usize,
}

/// The `limit` most common breeds, most common first. Pets without a breed
/// are skipped; equal counts keep the order breeds were first seen in.
pub fn top_breeds(pets: &[Pet], limit: usize) -> Vec<BreedCount> {
  let mut counts: Vec<BreedCount> = Vec::new();
  for breed in pets.iter().filter_map(|p| p.breed.as_deref()).filter(|b| !b.is_empty()) {
    match counts.iter_mut().find(|c| c.breed == breed) {
      Some(entry) => entry.count += 1,
      None => counts.push(BreedCount {
        breed: breed.to_string(),
        count: 1,
      }),
    }
  }

  counts.sort_by(|a, b| b.count.cmp(&a.count));
  counts.truncate(limit);
  counts
}

/// Species and breed counts for the summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PetBreakdown {
  pub species: BTreeMap<&'static str, usize>,
  pub top_breeds: Vec<BreedCount>,
}

/// Newest pending requests and newest arrivals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notifications {
  pub pending: Vec<RequestWithPet>,
  pub recent_pets: Vec<Pet>,
}
