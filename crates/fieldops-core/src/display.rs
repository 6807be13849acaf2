//! Derived display fields shared by the API views and the export adapter.
//!
//! Labels, badge tones, progress, dates and table layouts are computed here
//! and nowhere else, so a value reads the same on screen and in a document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  EntityStore,
  intervention::{Intervention, Priority, Status},
  manager::Manager,
  site::Site,
  technician::{Availability, Technician},
};

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn status_label(status: Status) -> &'static str {
  match status {
    Status::Unresolved => "Non résolue",
    Status::InProgress => "En cours",
    Status::Resolved => "Résolue",
  }
}

/// Progress percentage; a pure function of status.
pub fn progress(status: Status) -> u8 {
  match status {
    Status::Unresolved => 30,
    Status::InProgress => 65,
    Status::Resolved => 100,
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
  Danger,
  Warning,
  Success,
  Neutral,
}

pub fn status_badge(status: Status) -> BadgeTone {
  match status {
    Status::Unresolved => BadgeTone::Danger,
    Status::InProgress => BadgeTone::Warning,
    Status::Resolved => BadgeTone::Success,
  }
}

pub fn availability_label(availability: Availability) -> &'static str {
  match availability {
    Availability::Available => "Disponible",
    Availability::Busy => "Occupé",
    Availability::OnLeave => "En congé",
  }
}

pub fn availability_badge(availability: Availability) -> BadgeTone {
  match availability {
    Availability::Available => BadgeTone::Success,
    Availability::Busy => BadgeTone::Warning,
    Availability::OnLeave => BadgeTone::Neutral,
  }
}

pub fn priority_label(priority: Priority) -> &'static str {
  match priority {
    Priority::Low => "Basse",
    Priority::Normal => "Normale",
    Priority::High => "Haute",
    Priority::Critical => "Critique",
  }
}

// ─── Dates and durations ─────────────────────────────────────────────────────

/// `16/05/2023 14:00`
pub fn format_datetime(dt: DateTime<Utc>) -> String {
  dt.format("%d/%m/%Y %H:%M").to_string()
}

fn format_optional(dt: Option<DateTime<Utc>>) -> String {
  dt.map(format_datetime).unwrap_or_else(|| "—".to_string())
}

fn count(n: i64, one: &str, many: &str) -> String {
  if n <= 1 { format!("{n} {one}") } else { format!("{n} {many}") }
}

/// Whole hours and remaining minutes: `1 heure et 45 minutes`, `20 minutes`,
/// `2 heures`.
pub fn format_duration(total_minutes: i64) -> String {
  let total = total_minutes.max(0);
  let (hours, minutes) = (total / 60, total % 60);
  match (hours, minutes) {
    (0, m) => count(m, "minute", "minutes"),
    (h, 0) => count(h, "heure", "heures"),
    (h, m) => format!(
      "{} et {}",
      count(h, "heure", "heures"),
      count(m, "minute", "minutes")
    ),
  }
}

/// The resolution duration of a resolved intervention.
pub fn duration_label(intervention: &Intervention) -> Option<String> {
  intervention.resolution_minutes.map(format_duration)
}

// ─── Views ───────────────────────────────────────────────────────────────────

/// An intervention with every derived field the console displays.
#[derive(Debug, Clone, Serialize)]
pub struct InterventionView {
  #[serde(flatten)]
  pub intervention:    Intervention,
  pub status_label:    &'static str,
  pub badge:           BadgeTone,
  pub progress:        u8,
  pub priority_label:  &'static str,
  pub fault_label:     String,
  pub technician_name: Option<String>,
  pub duration:        Option<String>,
  pub finalized:       bool,
}

impl InterventionView {
  pub fn new(store: &EntityStore, intervention: &Intervention) -> Self {
    Self {
      status_label:    status_label(intervention.status),
      badge:           status_badge(intervention.status),
      progress:        progress(intervention.status),
      priority_label:  priority_label(intervention.priority),
      fault_label:     intervention.fault_type.label().to_string(),
      technician_name: technician_name(store, intervention),
      duration:        duration_label(intervention),
      finalized:       intervention.is_finalized(),
      intervention:    intervention.clone(),
    }
  }
}

/// A technician with the derived open-intervention count.
#[derive(Debug, Clone, Serialize)]
pub struct TechnicianView {
  #[serde(flatten)]
  pub technician:                Technician,
  pub full_name:                 String,
  pub availability_label:        &'static str,
  pub badge:                     BadgeTone,
  pub active_intervention_count: usize,
}

impl TechnicianView {
  pub fn new(store: &EntityStore, technician: &Technician) -> Self {
    Self {
      full_name:                 technician.full_name(),
      availability_label:        availability_label(technician.availability),
      badge:                     availability_badge(technician.availability),
      active_intervention_count: store.active_intervention_count(technician.id),
      technician:                technician.clone(),
    }
  }
}

fn technician_name(store: &EntityStore, intervention: &Intervention) -> Option<String> {
  intervention
    .technician
    .and_then(|id| store.technician(id).ok())
    .map(Technician::full_name)
}

// ─── Tables ──────────────────────────────────────────────────────────────────

/// Which entity table to lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
  Interventions,
  Technicians,
  Managers,
  Sites,
}

impl TableKind {
  pub const ALL: [TableKind; 4] = [
    TableKind::Interventions,
    TableKind::Technicians,
    TableKind::Managers,
    TableKind::Sites,
  ];

  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "interventions" => Some(Self::Interventions),
      "technicians" => Some(Self::Technicians),
      "managers" => Some(Self::Managers),
      "sites" => Some(Self::Sites),
      _ => None,
    }
  }
}

/// A display table: the same headers and cell strings feed the on-screen
/// listing and every export format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
  pub title:   String,
  /// Short name used as spreadsheet sheet name.
  pub sheet:   String,
  pub headers: Vec<String>,
  pub rows:    Vec<Vec<String>>,
}

impl Table {
  fn new(title: &str, sheet: &str, headers: &[&str]) -> Self {
    Self {
      title:   title.to_string(),
      sheet:   sheet.to_string(),
      headers: headers.iter().map(|h| h.to_string()).collect(),
      rows:    Vec::new(),
    }
  }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

pub const INTERVENTION_HEADERS: [&str; 10] = [
  "ID",
  "Site",
  "Type de panne",
  "Priorité",
  "Déclarée le",
  "Prévue le",
  "Résolue le",
  "Technicien",
  "Statut",
  "Durée",
];

pub fn interventions_table<'a>(
  store: &EntityStore,
  items: impl IntoIterator<Item = &'a Intervention>,
) -> Table {
  let mut table = Table::new("Liste des interventions", "Interventions", &INTERVENTION_HEADERS);
  for i in items {
    table.rows.push(vec![
      i.id.to_string(),
      i.site.name.clone(),
      i.fault_type.label().to_string(),
      priority_label(i.priority).to_string(),
      format_datetime(i.declared_at),
      format_optional(i.scheduled_at),
      format_optional(i.resolved_at),
      technician_name(store, i).unwrap_or_else(|| "Non assignée".to_string()),
      format!("{} ({}%)", status_label(i.status), progress(i.status)),
      duration_label(i).unwrap_or_default(),
    ]);
  }
  table
}

pub fn technicians_table<'a>(
  store: &EntityStore,
  items: impl IntoIterator<Item = &'a Technician>,
) -> Table {
  let mut table = Table::new(
    "Liste des techniciens",
    "Techniciens",
    &["ID", "Nom", "Spécialité", "Disponibilité", "Interventions actives", "Email", "Téléphone"],
  );
  for t in items {
    table.rows.push(vec![
      t.id.to_string(),
      t.full_name(),
      t.specialty.clone(),
      availability_label(t.availability).to_string(),
      store.active_intervention_count(t.id).to_string(),
      t.email.clone(),
      t.phone.clone(),
    ]);
  }
  table
}

pub fn managers_table<'a>(items: impl IntoIterator<Item = &'a Manager>) -> Table {
  let mut table = Table::new(
    "Liste des gestionnaires",
    "Gestionnaires",
    &["ID", "Nom", "Région", "Email", "Téléphone"],
  );
  for m in items {
    table.rows.push(vec![
      m.id.to_string(),
      m.full_name(),
      m.region.clone(),
      m.email.clone(),
      m.phone.clone(),
    ]);
  }
  table
}

pub fn sites_table<'a>(store: &EntityStore, items: impl IntoIterator<Item = &'a Site>) -> Table {
  let mut table = Table::new(
    "Liste des sites",
    "Sites",
    &["ID", "Nom", "Adresse", "Région", "Latitude", "Longitude", "Gestionnaire"],
  );
  for s in items {
    let manager = store
      .manager(s.manager_id)
      .map(Manager::full_name)
      .unwrap_or_else(|_| s.manager_id.to_string());
    table.rows.push(vec![
      s.id.to_string(),
      s.name.clone(),
      s.address.clone(),
      s.region.clone(),
      format!("{:.5}", s.coordinates.latitude),
      format!("{:.5}", s.coordinates.longitude),
      manager,
    ]);
  }
  table
}

/// Lay out every visible record of `kind`.
pub fn table(store: &EntityStore, kind: TableKind) -> Table {
  match kind {
    TableKind::Interventions => interventions_table(store, store.interventions()),
    TableKind::Technicians => technicians_table(store, store.technicians(&Default::default())),
    TableKind::Managers => managers_table(store.managers()),
    TableKind::Sites => sites_table(store, store.sites()),
  }
}
