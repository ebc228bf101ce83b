//! Form validation. Raw field values become drafts or a user-facing error
//! before any store is contacted.

use crate::error::ValidationError;

use super::types::{Pet, PetDraft, PetStatus, RequestDraft, Species};

/// Raw pet form values
#[derive(Debug, Clone, PartialEq)]
pub struct PetForm {
  pub name: String,
  pub species: Species,
  pub breed: String,
  pub age_months: String,
  pub gender: String,
  pub description: String,
  pub image_url: String,
  pub status: PetStatus,
  pub shelter_location: String,
  pub weight_kg: String,
  pub is_vaccinated: bool,
  pub is_neutered: bool,
}

impl Default for PetForm {
  fn default() -> Self {
    Self {
      name: String::new(),
      species: Species::Dog,
      breed: String::new(),
      age_months: String::new(),
      gender: String::new(),
      description: String::new(),
      image_url: String::new(),
      status: PetStatus::Available,
      shelter_location: String::new(),
      weight_kg: String::new(),
      is_vaccinated: false,
      is_neutered: false,
    }
  }
}

impl From<&Pet> for PetForm {
  /// Prefill the form for editing an existing pet.
  fn from(pet: &Pet) -> Self {
    Self {
      name: pet.name.clone(),
      species: pet.species,
      breed: pet.breed.clone().unwrap_or_default(),
      age_months: pet.age_months.to_string(),
      gender: pet.gender.clone(),
      description: pet.description.clone().unwrap_or_default(),
      image_url: pet.image_url.clone().unwrap_or_default(),
      status: pet.status,
      shelter_location: pet.shelter_location.clone().unwrap_or_default(),
      weight_kg: pet.weight_kg.map(|w| w.to_string()).unwrap_or_default(),
      is_vaccinated: pet.is_vaccinated,
      is_neutered: pet.is_neutered,
    }
  }
}

impl PetForm {
  pub fn validate(&self) -> Result<PetDraft, ValidationError> {
    let name = self.name.trim();
    if name.is_empty() {
      return Err(ValidationError::Required { field: "Name" });
    }

    let age_months = match self.age_months.trim() {
      "" => 0.0,
      raw => parse_non_negative(raw).ok_or(ValidationError::InvalidAge)?,
    };
    if age_months > f64::from(u32::MAX) {
      return Err(ValidationError::InvalidAge);
    }

    let weight_kg = match self.weight_kg.trim() {
      "" => None,
      raw => Some(parse_non_negative(raw).ok_or(ValidationError::InvalidWeight)?),
    };

    let gender = match self.gender.trim() {
      "" => "unknown".to_string(),
      g => g.to_string(),
    };

    let image_url = non_empty(&self.image_url).unwrap_or_else(|| self.species.stock_image_url().to_string());

    Ok(PetDraft {
      name: name.to_string(),
      species: self.species,
      breed: non_empty(&self.breed),
      age_months: age_months.floor() as u32,
      gender,
      description: non_empty(&self.description),
      image_url: Some(image_url),
      status: self.status,
      shelter_location: non_empty(&self.shelter_location),
      weight_kg,
      is_vaccinated: self.is_vaccinated,
      is_neutered: self.is_neutered,
    })
  }
}

/// Raw adoption request form values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestForm {
  pub name: String,
  pub email: String,
  pub phone: String,
  pub message: String,
}

impl RequestForm {
  pub fn validate(&self, pet_id: &str) -> Result<RequestDraft, ValidationError> {
    if pet_id.trim().is_empty() {
      return Err(ValidationError::Required { field: "Pet" });
    }

    let name = self.name.trim();
    if name.is_empty() {
      return Err(ValidationError::Required { field: "Name" });
    }

    let email = self.email.trim();
    if email.is_empty() {
      return Err(ValidationError::Required { field: "Email" });
    }
    if !is_plausible_email(email) {
      return Err(ValidationError::InvalidEmail);
    }

    Ok(RequestDraft {
      pet_id: pet_id.trim().to_string(),
      requester_name: name.to_string(),
      requester_email: email.to_string(),
      requester_phone: non_empty(&self.phone),
      message: non_empty(&self.message),
    })
  }
}

fn parse_non_negative(raw: &str) -> Option<f64> {
  let value: f64 = raw.trim().parse().ok()?;
  (value.is_finite() && value >= 0.0).then_some(value)
}

fn non_empty(raw: &str) -> Option<String> {
  let trimmed = raw.trim();
  (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn is_plausible_email(email: &str) -> bool {
  match email.split_once('@') {
    Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
    None => false,
  }
}
