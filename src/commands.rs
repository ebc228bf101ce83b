//! CLI subcommands and their handlers.

use clap::{Args, Subcommand};
use color_eyre::Result;
use futures::future::join;
use serde::Serialize;
use std::io::Write;

use crate::cache::{Fetched, Mode};
use crate::error::RemoteError;
use crate::query::{ListQuery, Order, OrderColumn};
use crate::remote::RemoteTable;
use crate::shelter::types::{
  AdoptionRequest, Pet, PetFilter, PetPatch, PetStatus, RequestFilter, RequestPatch, RequestStatus, Species,
};
use crate::shelter::validate::{PetForm, RequestForm};
use crate::shelter::views::{self, RequestWithPet};
use crate::shelter::Shelter;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Browse and manage pets
  Pets {
    #[command(subcommand)]
    action: PetCommand,
  },
  /// Browse and manage adoption requests
  Requests {
    #[command(subcommand)]
    action: RequestCommand,
  },
  /// Request counts by status, pets per species and the top breeds
  Summary,
  /// Newest pending requests and newest arrivals
  Notifications,
  /// Probe both tables and report which store serves each
  Status,
}

#[derive(Subcommand, Debug)]
pub enum PetCommand {
  List {
    #[arg(long, value_enum)]
    species: Option<Species>,
    #[arg(long, value_enum)]
    status: Option<PetStatus>,
    /// Case-insensitive match on name or breed
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    limit: Option<usize>,
    /// Most recently edited first, instead of newest first
    #[arg(long)]
    recently_updated: bool,
  },
  Show {
    id: String,
  },
  Add(PetArgs),
  /// Edit a pet; omitted fields keep their current value
  Edit {
    id: String,
    #[command(flatten)]
    fields: PetArgs,
  },
  Delete {
    id: String,
  },
}

/// Pet form fields. An empty string clears an optional field.
#[derive(Args, Debug, Default)]
pub struct PetArgs {
  #[arg(long)]
  pub name: Option<String>,
  #[arg(long, value_enum)]
  pub species: Option<Species>,
  #[arg(long)]
  pub breed: Option<String>,
  #[arg(long = "age")]
  pub age_months: Option<String>,
  #[arg(long)]
  pub gender: Option<String>,
  #[arg(long)]
  pub description: Option<String>,
  #[arg(long = "image")]
  pub image_url: Option<String>,
  #[arg(long, value_enum)]
  pub status: Option<PetStatus>,
  #[arg(long = "location")]
  pub shelter_location: Option<String>,
  #[arg(long = "weight")]
  pub weight_kg: Option<String>,
  #[arg(long)]
  pub vaccinated: Option<bool>,
  #[arg(long)]
  pub neutered: Option<bool>,
}

impl PetArgs {
  /// Overlay the given fields on `form`.
  fn apply(self, mut form: PetForm) -> PetForm {
    if let Some(v) = self.name {
      form.name = v;
    }
    if let Some(v) = self.species {
      form.species = v;
    }
    if let Some(v) = self.breed {
      form.breed = v;
    }
    if let Some(v) = self.age_months {
      form.age_months = v;
    }
    if let Some(v) = self.gender {
      form.gender = v;
    }
    if let Some(v) = self.description {
      form.description = v;
    }
    if let Some(v) = self.image_url {
      form.image_url = v;
    }
    if let Some(v) = self.status {
      form.status = v;
    }
    if let Some(v) = self.shelter_location {
      form.shelter_location = v;
    }
    if let Some(v) = self.weight_kg {
      form.weight_kg = v;
    }
    if let Some(v) = self.vaccinated {
      form.is_vaccinated = v;
    }
    if let Some(v) = self.neutered {
      form.is_neutered = v;
    }
    form
  }
}

#[derive(Subcommand, Debug)]
pub enum RequestCommand {
  List {
    #[arg(long, value_enum)]
    status: Option<RequestStatus>,
    /// Only requests for this pet
    #[arg(long)]
    pet: Option<String>,
  },
  /// Submit an adoption request; it starts out pending
  Submit {
    pet_id: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    message: String,
  },
  Approve {
    id: String,
  },
  Reject {
    id: String,
  },
  /// Move a request back to pending
  Reset {
    id: String,
  },
  Delete {
    id: String,
  },
}

/// Writes results as text lines or JSON and remembers whether anything
/// was served from the local mirror.
pub struct Printer<W: Write> {
  out: W,
  json: bool,
  served_local: bool,
}

impl<W: Write> Printer<W> {
  pub fn new(out: W, json: bool) -> Self {
    Self {
      out,
      json,
      served_local: false,
    }
  }

  pub fn served_local(&self) -> bool {
    self.served_local
  }

  pub fn into_inner(self) -> W {
    self.out
  }

  fn seen<T>(&mut self, fetched: Fetched<T>) -> T {
    self.served_local |= fetched.is_local();
    fetched.data
  }

  /// Print `value` as JSON, or as the text produced by `text`.
  fn emit<T: Serialize>(&mut self, value: &T, text: impl FnOnce(&T) -> Vec<String>) -> Result<()> {
    if self.json {
      writeln!(self.out, "{}", serde_json::to_string_pretty(value)?)?;
    } else {
      for line in text(value) {
        writeln!(self.out, "{}", line)?;
      }
    }
    Ok(())
  }

  fn line(&mut self, message: &str) -> Result<()> {
    if self.json {
      writeln!(self.out, "{}", serde_json::json!({ "message": message }))?;
    } else {
      writeln!(self.out, "{}", message)?;
    }
    Ok(())
  }
}

pub async fn run<P, Q, W>(shelter: &Shelter<P, Q>, command: Command, printer: &mut Printer<W>) -> Result<()>
where
  P: RemoteTable<Pet>,
  Q: RemoteTable<AdoptionRequest>,
  W: Write,
{
  match command {
    Command::Pets { action } => run_pets(shelter, action, printer).await,
    Command::Requests { action } => run_requests(shelter, action, printer).await,
    Command::Summary => summary(shelter, printer).await,
    Command::Notifications => notifications(shelter, printer).await,
    Command::Status => status(shelter, printer).await,
  }
}

async fn run_pets<P, Q, W>(shelter: &Shelter<P, Q>, action: PetCommand, printer: &mut Printer<W>) -> Result<()>
where
  P: RemoteTable<Pet>,
  Q: RemoteTable<AdoptionRequest>,
  W: Write,
{
  match action {
    PetCommand::List {
      species,
      status,
      search,
      limit,
      recently_updated,
    } => {
      let mut query = ListQuery::filtered(PetFilter { species, status });
      if recently_updated {
        query = query.with_order(Order {
          column: OrderColumn::UpdatedAt,
          ascending: false,
        });
      }
      if let Some(limit) = limit {
        query = query.with_limit(limit);
      }
      let pets = printer.seen(shelter.pets.list(&query).await?);
      let found: Vec<&Pet> = views::search_pets(&pets, None, search.as_deref().unwrap_or(""));
      printer.emit(&found, |pets| pets.iter().map(|p| pet_row(p)).collect())
    }
    PetCommand::Show { id } => match printer.seen(shelter.pets.get(&id).await?) {
      Some(pet) => printer.emit(&pet, pet_details),
      None => printer.line("Pet not found."),
    },
    PetCommand::Add(fields) => {
      let draft = fields.apply(PetForm::default()).validate()?;
      let pet = printer.seen(shelter.pets.create(draft).await?);
      printer.emit(&pet, |p| vec![format!("Added {} ({})", p.name, p.id)])
    }
    PetCommand::Edit { id, fields } => {
      let Some(current) = printer.seen(shelter.pets.get(&id).await?) else {
        return printer.line("Pet not found.");
      };
      let draft = fields.apply(PetForm::from(&current)).validate()?;
      match printer.seen(shelter.pets.update(&id, PetPatch::from(draft)).await?) {
        Some(pet) => printer.emit(&pet, |p| vec![format!("Updated {} ({})", p.name, p.id)]),
        None => printer.line("Pet not found."),
      }
    }
    PetCommand::Delete { id } => {
      printer.seen(shelter.pets.delete(&id).await?);
      printer.line("Pet deleted.")
    }
  }
}

async fn run_requests<P, Q, W>(shelter: &Shelter<P, Q>, action: RequestCommand, printer: &mut Printer<W>) -> Result<()>
where
  P: RemoteTable<Pet>,
  Q: RemoteTable<AdoptionRequest>,
  W: Write,
{
  let transition = |id: String, status: RequestStatus| (id, RequestPatch::status(status));

  let (id, patch) = match action {
    RequestCommand::List { status, pet } => {
      let query = ListQuery::filtered(RequestFilter { status, pet_id: pet });
      let rows = printer.seen(shelter.requests_with_pets(&query).await?);
      return printer.emit(&rows, |rows| rows.iter().map(request_row).collect());
    }
    RequestCommand::Submit {
      pet_id,
      name,
      email,
      phone,
      message,
    } => {
      let form = RequestForm {
        name,
        email,
        phone,
        message,
      };
      let draft = form.validate(&pet_id)?;
      let request = printer.seen(shelter.requests.create(draft).await?);
      return printer.emit(&request, |r| vec![format!("Request {} submitted ({})", r.id, r.status)]);
    }
    RequestCommand::Delete { id } => {
      printer.seen(shelter.requests.delete(&id).await?);
      return printer.line("Request deleted.");
    }
    RequestCommand::Approve { id } => transition(id, RequestStatus::Approved),
    RequestCommand::Reject { id } => transition(id, RequestStatus::Rejected),
    RequestCommand::Reset { id } => transition(id, RequestStatus::Pending),
  };

  match printer.seen(shelter.requests.update(&id, patch).await?) {
    Some(request) => printer.emit(&request, |r| vec![format!("Request {} is now {}", r.id, r.status)]),
    None => printer.line("Request not found."),
  }
}

async fn summary<P, Q, W>(shelter: &Shelter<P, Q>, printer: &mut Printer<W>) -> Result<()>
where
  P: RemoteTable<Pet>,
  Q: RemoteTable<AdoptionRequest>,
  W: Write,
{
  let requests = printer.seen(shelter.request_summary().await?);
  let pets = printer.seen(shelter.pet_breakdown().await?);

  let value = serde_json::json!({
    "requests": requests,
    "species": pets.species,
    "top_breeds": pets.top_breeds,
  });
  printer.emit(&value, |_| {
    let mut lines = vec![format!(
      "Requests: {} total, {} pending, {} approved, {} rejected",
      requests.total, requests.pending, requests.approved, requests.rejected
    )];
    lines.push("Species:".to_string());
    lines.extend(pets.species.iter().map(|(name, count)| format!("  {:<8} {}", name, count)));
    lines.push("Top breeds:".to_string());
    lines.extend(pets.top_breeds.iter().map(|b| format!("  {:<20} {}", b.breed, b.count)));
    lines
  })
}

async fn notifications<P, Q, W>(shelter: &Shelter<P, Q>, printer: &mut Printer<W>) -> Result<()>
where
  P: RemoteTable<Pet>,
  Q: RemoteTable<AdoptionRequest>,
  W: Write,
{
  let feed = printer.seen(shelter.notifications().await?);

  printer.emit(&feed, |feed| {
    let mut lines = vec!["Pending requests:".to_string()];
    if feed.pending.is_empty() {
      lines.push("  none".to_string());
    }
    lines.extend(feed.pending.iter().map(|row| {
      format!(
        "  {} wants to adopt {} ({})",
        row.request.requester_name,
        row.pet_name.as_deref().unwrap_or("Unknown pet"),
        row.request.created_at.format("%Y-%m-%d")
      )
    }));

    lines.push("New arrivals:".to_string());
    if feed.recent_pets.is_empty() {
      lines.push("  none".to_string());
    }
    lines.extend(
      feed
        .recent_pets
        .iter()
        .map(|pet| format!("  {} ({}, {})", pet.name, pet.status, pet.created_at.format("%Y-%m-%d"))),
    );
    lines
  })
}

#[derive(Serialize)]
struct TableStatus {
  table: &'static str,
  mode: Option<String>,
  error: Option<String>,
  #[serde(skip)]
  local: bool,
}

impl TableStatus {
  fn new<T>(table: &'static str, result: Result<Fetched<T>, RemoteError>) -> Self {
    match result {
      Ok(fetched) => Self {
        table,
        mode: Some(fetched.mode.to_string()),
        error: None,
        local: fetched.mode == Mode::Local,
      },
      Err(e) => Self {
        table,
        mode: None,
        error: Some(e.message().to_string()),
        local: false,
      },
    }
  }
}

async fn status<P, Q, W>(shelter: &Shelter<P, Q>, printer: &mut Printer<W>) -> Result<()>
where
  P: RemoteTable<Pet>,
  Q: RemoteTable<AdoptionRequest>,
  W: Write,
{
  let (pets, requests) = join(
    shelter.pets.list(&ListQuery::default().with_limit(1)),
    shelter.requests.list(&ListQuery::default().with_limit(1)),
  )
  .await;

  let rows = [
    TableStatus::new("pets", pets),
    TableStatus::new("adoption_requests", requests),
  ];
  printer.served_local |= rows.iter().any(|r| r.local);

  printer.emit(&rows, |rows| {
    rows
      .iter()
      .map(|r| match (&r.mode, &r.error) {
        (Some(mode), _) => format!("{:<18} {}", r.table, mode),
        (None, Some(error)) => format!("{:<18} error: {}", r.table, error),
        (None, None) => format!("{:<18} unknown", r.table),
      })
      .collect()
  })
}

fn pet_row(pet: &Pet) -> String {
  format!(
    "{:<38} {:<12} {:<7} {:<9} {}",
    pet.id,
    pet.name,
    pet.species,
    pet.status,
    format_age(pet.age_months)
  )
}

fn pet_details(pet: &Pet) -> Vec<String> {
  let flag = |b: bool| if b { "yes" } else { "no" };
  let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

  vec![
    format!("{} ({})", pet.name, pet.id),
    format!("Species:     {}", pet.species),
    format!("Breed:       {}", opt(&pet.breed)),
    format!("Age:         {}", format_age(pet.age_months)),
    format!("Gender:      {}", pet.gender),
    format!("Status:      {}", pet.status),
    format!("Location:    {}", opt(&pet.shelter_location)),
    format!(
      "Weight:      {}",
      pet.weight_kg.map(|w| format!("{} kg", w)).unwrap_or_else(|| "-".to_string())
    ),
    format!("Vaccinated:  {}", flag(pet.is_vaccinated)),
    format!("Neutered:    {}", flag(pet.is_neutered)),
    format!("Image:       {}", pet.display_image()),
    format!("Description: {}", opt(&pet.description)),
  ]
}

fn request_row(row: &RequestWithPet) -> String {
  let request = &row.request;
  format!(
    "{:<38} {:<9} {:<12} {} <{}>",
    request.id,
    request.status,
    row.pet_name.as_deref().unwrap_or("Unknown pet"),
    request.requester_name,
    request.requester_email
  )
}

/// Age in months as shown to adopters, e.g. "2 yrs 3 mos"
pub fn format_age(months: u32) -> String {
  let plural = |n: u32, unit: &str| if n == 1 { format!("1 {}", unit) } else { format!("{} {}s", n, unit) };

  match (months / 12, months % 12) {
    (0, m) => plural(m, "mo"),
    (y, 0) => plural(y, "yr"),
    (y, m) => format!("{} {}", plural(y, "yr"), plural(m, "mo")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{MemoryStorage, ModePolicy};
  use crate::shelter::seed::default_pets;
  use crate::shelter::testing::ScriptedTable;
  use std::sync::Arc;

  fn local_shelter() -> Shelter<ScriptedTable<Pet>, ScriptedTable<AdoptionRequest>> {
    Shelter::new(
      ScriptedTable::failing("Could not find the table 'public.pets' in the schema cache", "public.pets"),
      ScriptedTable::failing(
        "Could not find the table 'public.adoption_requests' in the schema cache",
        "public.adoption_requests",
      ),
      Arc::new(MemoryStorage::new()),
      ModePolicy::Sticky,
      false,
    )
  }

  async fn output(shelter: &Shelter<ScriptedTable<Pet>, ScriptedTable<AdoptionRequest>>, command: Command) -> (String, bool) {
    let mut printer = Printer::new(Vec::new(), false);
    run(shelter, command, &mut printer).await.unwrap();
    let local = printer.served_local();
    (String::from_utf8(printer.into_inner()).unwrap(), local)
  }

  #[test]
  fn test_format_age() {
    assert_eq!(format_age(0), "0 mos");
    assert_eq!(format_age(1), "1 mo");
    assert_eq!(format_age(12), "1 yr");
    assert_eq!(format_age(27), "2 yrs 3 mos");
  }

  #[test]
  fn test_pet_args_overlay_keeps_unset_fields() {
    let pet = &default_pets()[0];
    let args = PetArgs {
      name: Some("Maximus".into()),
      breed: Some("".into()),
      ..Default::default()
    };
    let form = args.apply(PetForm::from(pet));
    assert_eq!(form.name, "Maximus");
    assert_eq!(form.breed, "");
    assert_eq!(form.species, pet.species);
    assert_eq!(form.age_months, pet.age_months.to_string());
  }

  #[tokio::test]
  async fn test_pets_list_search_in_local_mode() {
    let shelter = local_shelter();
    let (out, local) = output(
      &shelter,
      Command::Pets {
        action: PetCommand::List {
          species: None,
          status: None,
          search: Some("luna".into()),
          limit: None,
          recently_updated: false,
        },
      },
    )
    .await;

    assert!(local);
    assert_eq!(out.lines().count(), 1);
    assert!(out.contains("Luna"));
  }

  #[tokio::test]
  async fn test_show_unknown_pet() {
    let shelter = local_shelter();
    let (out, _) = output(
      &shelter,
      Command::Pets {
        action: PetCommand::Show { id: "nope".into() },
      },
    )
    .await;
    assert_eq!(out.trim(), "Pet not found.");
  }

  #[tokio::test]
  async fn test_approve_then_list() {
    let shelter = local_shelter();
    let id = crate::shelter::seed::default_requests()[0].id.clone();

    let (out, _) = output(
      &shelter,
      Command::Requests {
        action: RequestCommand::Approve { id: id.clone() },
      },
    )
    .await;
    assert!(out.contains("is now approved"));

    let (out, local) = output(
      &shelter,
      Command::Requests {
        action: RequestCommand::List {
          status: Some(RequestStatus::Approved),
          pet: None,
        },
      },
    )
    .await;
    assert!(local);
    assert_eq!(out.lines().count(), 2);
    assert!(out.contains("Max"));
  }

  #[tokio::test]
  async fn test_add_rejects_invalid_form() {
    let shelter = local_shelter();
    let mut printer = Printer::new(Vec::new(), false);
    let command = Command::Pets {
      action: PetCommand::Add(PetArgs {
        name: Some("Pip".into()),
        age_months: Some("-3".into()),
        ..Default::default()
      }),
    };

    let err = run(&shelter, command, &mut printer).await.unwrap_err();
    assert_eq!(err.to_string(), "Age in months must be a valid positive number.");
  }

  #[tokio::test]
  async fn test_status_reports_each_table() {
    let shelter = Shelter::new(
      ScriptedTable::with_rows(default_pets()),
      ScriptedTable::failing("permission denied", "public.adoption_requests"),
      Arc::new(MemoryStorage::new()),
      ModePolicy::Sticky,
      false,
    );
    let (out, local) = output(&shelter, Command::Status).await;
    assert!(!local);
    assert!(out.contains("pets               remote"));
    assert!(out.contains("adoption_requests  error: permission denied"));
  }

  #[tokio::test]
  async fn test_notifications_in_local_mode() {
    let shelter = local_shelter();
    let (out, local) = output(&shelter, Command::Notifications).await;

    assert!(local);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Pending requests:");
    assert!(lines[1].contains("wants to adopt Max"));
    assert_eq!(lines[2], "New arrivals:");
    assert_eq!(lines.len(), 3 + 5);
  }

  #[tokio::test]
  async fn test_summary_lists_top_breeds() {
    let shelter = local_shelter();
    let (out, local) = output(&shelter, Command::Summary).await;

    assert!(local);
    assert!(out.starts_with("Requests: 3 total, 1 pending, 1 approved, 1 rejected"));
    assert!(out.contains("Top breeds:"));
    assert!(out.contains("  Labrador Retriever   1"));
  }
}
