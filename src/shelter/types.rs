use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Record;

use super::seed;

/// Kind of animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Species {
  Dog,
  Cat,
  Rabbit,
  Bird,
  Other,
}

impl Species {
  pub const ALL: [Species; 5] = [
    Species::Dog,
    Species::Cat,
    Species::Rabbit,
    Species::Bird,
    Species::Other,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Species::Dog => "dog",
      Species::Cat => "cat",
      Species::Rabbit => "rabbit",
      Species::Bird => "bird",
      Species::Other => "other",
    }
  }

  /// Stock photo used when a pet has no image of its own
  pub fn stock_image_url(self) -> &'static str {
    match self {
      Species::Dog => {
        "https://images.unsplash.com/photo-1583511655857-d19b40a7a54e?auto=format&fit=crop&w=900&q=80"
      }
      Species::Cat => {
        "https://images.unsplash.com/photo-1511044568932-338cba0ad803?auto=format&fit=crop&w=900&q=80"
      }
      Species::Rabbit => {
        "https://images.unsplash.com/photo-1585110396000-c9ffd4e4b308?auto=format&fit=crop&w=900&q=80"
      }
      Species::Bird => {
        "https://images.unsplash.com/photo-1522926193341-e9ffd686c60f?auto=format&fit=crop&w=900&q=80"
      }
      Species::Other => {
        "https://images.unsplash.com/photo-1548767797-d8c844163c4c?auto=format&fit=crop&w=900&q=80"
      }
    }
  }
}

impl std::fmt::Display for Species {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Adoption availability of a pet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
  Available,
  Pending,
  Adopted,
}

impl PetStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      PetStatus::Available => "available",
      PetStatus::Pending => "pending",
      PetStatus::Adopted => "adopted",
    }
  }
}

impl std::fmt::Display for PetStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Review state of an adoption request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
  Pending,
  Approved,
  Rejected,
}

impl RequestStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      RequestStatus::Pending => "pending",
      RequestStatus::Approved => "approved",
      RequestStatus::Rejected => "rejected",
    }
  }
}

impl std::fmt::Display for RequestStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ============================================================================
// Pets
// ============================================================================

/// An animal available for adoption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
  pub id: String,
  pub name: String,
  pub species: Species,
  pub breed: Option<String>,
  pub age_months: u32,
  pub gender: String,
  pub description: Option<String>,
  pub image_url: Option<String>,
  pub status: PetStatus,
  pub shelter_location: Option<String>,
  pub weight_kg: Option<f64>,
  pub is_vaccinated: bool,
  pub is_neutered: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Pet {
  /// The pet's own image, or the species stock photo
  pub fn display_image(&self) -> &str {
    self
      .image_url
      .as_deref()
      .filter(|url| !url.is_empty())
      .unwrap_or_else(|| self.species.stock_image_url())
  }
}

/// Fields for a new pet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PetDraft {
  pub name: String,
  pub species: Species,
  pub breed: Option<String>,
  pub age_months: u32,
  pub gender: String,
  pub description: Option<String>,
  pub image_url: Option<String>,
  pub status: PetStatus,
  pub shelter_location: Option<String>,
  pub weight_kg: Option<f64>,
  pub is_vaccinated: bool,
  pub is_neutered: bool,
}

/// Edits to an existing pet.
///
/// `None` leaves a field alone; for nullable columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PetPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub species: Option<Species>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub breed: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub age_months: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gender: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image_url: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<PetStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub shelter_location: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub weight_kg: Option<Option<f64>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_vaccinated: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_neutered: Option<bool>,
}

impl PetPatch {
  pub fn status(status: PetStatus) -> Self {
    Self {
      status: Some(status),
      ..Default::default()
    }
  }
}

impl From<PetDraft> for PetPatch {
  /// Replace every mutable field, as the edit form does.
  fn from(draft: PetDraft) -> Self {
    Self {
      name: Some(draft.name),
      species: Some(draft.species),
      breed: Some(draft.breed),
      age_months: Some(draft.age_months),
      gender: Some(draft.gender),
      description: Some(draft.description),
      image_url: Some(draft.image_url),
      status: Some(draft.status),
      shelter_location: Some(draft.shelter_location),
      weight_kg: Some(draft.weight_kg),
      is_vaccinated: Some(draft.is_vaccinated),
      is_neutered: Some(draft.is_neutered),
    }
  }
}

/// Equality filters for listing pets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetFilter {
  pub species: Option<Species>,
  pub status: Option<PetStatus>,
}

impl Record for Pet {
  type Draft = PetDraft;
  type Patch = PetPatch;
  type Filter = PetFilter;

  fn table() -> &'static str {
    "pets"
  }

  fn storage_key() -> &'static str {
    "pawhome_demo_pets"
  }

  fn seed() -> Vec<Self> {
    seed::default_pets()
  }

  fn id(&self) -> &str {
    &self.id
  }

  fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  fn updated_at(&self) -> DateTime<Utc> {
    self.updated_at
  }

  fn prepare_draft(draft: &mut PetDraft) {
    if draft.image_url.as_deref().map_or(true, str::is_empty) {
      draft.image_url = Some(draft.species.stock_image_url().to_string());
    }
  }

  fn from_draft(id: String, mut draft: PetDraft, now: DateTime<Utc>) -> Self {
    Self::prepare_draft(&mut draft);
    Self {
      id,
      name: draft.name,
      species: draft.species,
      breed: draft.breed,
      age_months: draft.age_months,
      gender: draft.gender,
      description: draft.description,
      image_url: draft.image_url,
      status: draft.status,
      shelter_location: draft.shelter_location,
      weight_kg: draft.weight_kg,
      is_vaccinated: draft.is_vaccinated,
      is_neutered: draft.is_neutered,
      created_at: now,
      updated_at: now,
    }
  }

  fn apply_patch(&mut self, patch: PetPatch, now: DateTime<Utc>) {
    if let Some(name) = patch.name {
      self.name = name;
    }
    if let Some(species) = patch.species {
      self.species = species;
    }
    if let Some(breed) = patch.breed {
      self.breed = breed;
    }
    if let Some(age_months) = patch.age_months {
      self.age_months = age_months;
    }
    if let Some(gender) = patch.gender {
      self.gender = gender;
    }
    if let Some(description) = patch.description {
      self.description = description;
    }
    if let Some(image_url) = patch.image_url {
      self.image_url = image_url;
    }
    if let Some(status) = patch.status {
      self.status = status;
    }
    if let Some(shelter_location) = patch.shelter_location {
      self.shelter_location = shelter_location;
    }
    if let Some(weight_kg) = patch.weight_kg {
      self.weight_kg = weight_kg;
    }
    if let Some(is_vaccinated) = patch.is_vaccinated {
      self.is_vaccinated = is_vaccinated;
    }
    if let Some(is_neutered) = patch.is_neutered {
      self.is_neutered = is_neutered;
    }
    self.updated_at = now.max(self.created_at);
  }

  fn filter_params(filter: &PetFilter) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(species) = filter.species {
      params.push(("species", species.as_str().to_string()));
    }
    if let Some(status) = filter.status {
      params.push(("status", status.as_str().to_string()));
    }
    params
  }

  fn matches(&self, filter: &PetFilter) -> bool {
    filter.species.map_or(true, |s| self.species == s) && filter.status.map_or(true, |s| self.status == s)
  }
}

// ============================================================================
// Adoption requests
// ============================================================================

/// An adoption inquiry for one pet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionRequest {
  pub id: String,
  /// Logical reference to a pet; not checked by the data layer
  pub pet_id: String,
  pub requester_name: String,
  pub requester_email: String,
  pub requester_phone: Option<String>,
  pub message: Option<String>,
  pub status: RequestStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Fields for a new request. New requests always start pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDraft {
  pub pet_id: String,
  pub requester_name: String,
  pub requester_email: String,
  pub requester_phone: Option<String>,
  pub message: Option<String>,
}

/// Edits to an existing request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<RequestStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub requester_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub requester_email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub requester_phone: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<Option<String>>,
}

impl RequestPatch {
  pub fn status(status: RequestStatus) -> Self {
    Self {
      status: Some(status),
      ..Default::default()
    }
  }
}

/// Equality filters for listing requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
  pub status: Option<RequestStatus>,
  pub pet_id: Option<String>,
}

impl Record for AdoptionRequest {
  type Draft = RequestDraft;
  type Patch = RequestPatch;
  type Filter = RequestFilter;

  fn table() -> &'static str {
    "adoption_requests"
  }

  fn storage_key() -> &'static str {
    "pawhome_demo_requests"
  }

  fn seed() -> Vec<Self> {
    seed::default_requests()
  }

  fn id(&self) -> &str {
    &self.id
  }

  fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  fn updated_at(&self) -> DateTime<Utc> {
    self.updated_at
  }

  fn from_draft(id: String, draft: RequestDraft, now: DateTime<Utc>) -> Self {
    Self {
      id,
      pet_id: draft.pet_id,
      requester_name: draft.requester_name,
      requester_email: draft.requester_email,
      requester_phone: draft.requester_phone,
      message: draft.message,
      status: RequestStatus::Pending,
      created_at: now,
      updated_at: now,
    }
  }

  fn apply_patch(&mut self, patch: RequestPatch, now: DateTime<Utc>) {
    if let Some(status) = patch.status {
      self.status = status;
    }
    if let Some(name) = patch.requester_name {
      self.requester_name = name;
    }
    if let Some(email) = patch.requester_email {
      self.requester_email = email;
    }
    if let Some(phone) = patch.requester_phone {
      self.requester_phone = phone;
    }
    if let Some(message) = patch.message {
      self.message = message;
    }
    self.updated_at = now.max(self.created_at);
  }

  fn filter_params(filter: &RequestFilter) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(status) = filter.status {
      params.push(("status", status.as_str().to_string()));
    }
    if let Some(pet_id) = &filter.pet_id {
      params.push(("pet_id", pet_id.clone()));
    }
    params
  }

  fn matches(&self, filter: &RequestFilter) -> bool {
    filter.status.map_or(true, |s| self.status == s)
      && filter.pet_id.as_deref().map_or(true, |id| self.pet_id == id)
  }
}
