//! Canonical records for seeding an empty local mirror.

use chrono::{DateTime, NaiveDate, Utc};

use super::types::{AdoptionRequest, Pet, PetStatus, RequestStatus, Species};

const MAX_ID: &str = "11111111-1111-4111-8111-111111111111";
const LUNA_ID: &str = "22222222-2222-4222-8222-222222222222";
const COCO_ID: &str = "33333333-3333-4333-8333-333333333333";
const KIWI_ID: &str = "44444444-4444-4444-8444-444444444444";
const ROCKY_ID: &str = "55555555-5555-4555-8555-555555555555";

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
  NaiveDate::from_ymd_opt(2026, 2, day)
    .and_then(|d| d.and_hms_opt(hour, minute, 0))
    .map(|dt| dt.and_utc())
    .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn pet(
  id: &str,
  name: &str,
  species: Species,
  breed: &str,
  age_months: u32,
  gender: &str,
  description: &str,
  status: PetStatus,
  shelter_location: &str,
  weight_kg: f64,
  is_vaccinated: bool,
  is_neutered: bool,
  created_at: DateTime<Utc>,
) -> Pet {
  Pet {
    id: id.to_string(),
    name: name.to_string(),
    species,
    breed: Some(breed.to_string()),
    age_months,
    gender: gender.to_string(),
    description: Some(description.to_string()),
    image_url: Some(species.stock_image_url().to_string()),
    status,
    shelter_location: Some(shelter_location.to_string()),
    weight_kg: Some(weight_kg),
    is_vaccinated,
    is_neutered,
    created_at,
    updated_at: created_at,
  }
}

/// Five pets, newest first
pub fn default_pets() -> Vec<Pet> {
  vec![
    pet(
      MAX_ID,
      "Max",
      Species::Dog,
      "Labrador Retriever",
      30,
      "male",
      "Friendly, energetic, and great with children.",
      PetStatus::Available,
      "Downtown Shelter",
      24.5,
      true,
      true,
      at(20, 9, 0),
    ),
    pet(
      LUNA_ID,
      "Luna",
      Species::Cat,
      "Domestic Shorthair",
      18,
      "female",
      "Calm indoor cat who loves cozy spaces.",
      PetStatus::Available,
      "North Branch",
      4.2,
      true,
      false,
      at(19, 10, 0),
    ),
    pet(
      COCO_ID,
      "Coco",
      Species::Rabbit,
      "Holland Lop",
      10,
      "female",
      "Gentle rabbit that enjoys soft toys and quiet corners.",
      PetStatus::Pending,
      "East Care Center",
      1.7,
      true,
      false,
      at(18, 11, 0),
    ),
    pet(
      KIWI_ID,
      "Kiwi",
      Species::Bird,
      "Parakeet",
      8,
      "male",
      "Social bird with bright feathers and a playful nature.",
      PetStatus::Available,
      "Green Aviary",
      0.12,
      false,
      false,
      at(17, 12, 0),
    ),
    pet(
      ROCKY_ID,
      "Rocky",
      Species::Other,
      "Guinea Pig",
      14,
      "male",
      "Curious and sweet, enjoys fresh veggies and gentle care.",
      PetStatus::Available,
      "West Habitat",
      0.95,
      false,
      false,
      at(16, 13, 0),
    ),
  ]
}

/// One request in each status, newest first
pub fn default_requests() -> Vec<AdoptionRequest> {
  vec![
    AdoptionRequest {
      id: "aaaaaaa1-aaaa-4aaa-8aaa-aaaaaaaaaaa1".to_string(),
      pet_id: MAX_ID.to_string(),
      requester_name: "Riya Sharma".to_string(),
      requester_email: "riya@example.com".to_string(),
      requester_phone: Some("+1-555-1001".to_string()),
      message: Some("I have experience caring for large dogs.".to_string()),
      status: RequestStatus::Pending,
      created_at: at(21, 10, 15),
      updated_at: at(21, 10, 15),
    },
    AdoptionRequest {
      id: "aaaaaaa2-aaaa-4aaa-8aaa-aaaaaaaaaaa2".to_string(),
      pet_id: LUNA_ID.to_string(),
      requester_name: "Anita Verma".to_string(),
      requester_email: "anita@example.com".to_string(),
      requester_phone: Some("+1-555-1002".to_string()),
      message: Some("Looking for a calm companion cat.".to_string()),
      status: RequestStatus::Approved,
      created_at: at(20, 8, 40),
      updated_at: at(22, 11, 0),
    },
    AdoptionRequest {
      id: "aaaaaaa3-aaaa-4aaa-8aaa-aaaaaaaaaaa3".to_string(),
      pet_id: COCO_ID.to_string(),
      requester_name: "Rahul Jain".to_string(),
      requester_email: "rahul@example.com".to_string(),
      requester_phone: None,
      message: Some("We have a safe indoor setup for rabbits.".to_string()),
      status: RequestStatus::Rejected,
      created_at: at(19, 7, 30),
      updated_at: at(20, 9, 45),
    },
  ]
}
