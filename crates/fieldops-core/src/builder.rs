//! Draft records and their validation.
//!
//! Drafts come from forms or API bodies and may be incomplete. Only a
//! [`Validated`] draft can be handed to the [`EntityStore`](crate::EntityStore).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  assignment::Assignment,
  ids::{ManagerId, SiteId, TechnicianId},
  intervention::{FaultType, Priority},
  site::Coordinates,
  technician::Availability,
};

/// A draft that passed [`Draft::validate`]. Cannot be built any other way.
#[derive(Debug, Clone)]
pub struct Validated<T>(pub(crate) T);

impl<T> Validated<T> {
  pub fn get(&self) -> &T { &self.0 }

  pub fn into_inner(self) -> T { self.0 }
}

pub trait Draft: Sized {
  fn check(&self) -> Result<()>;

  fn validate(self) -> Result<Validated<Self>> {
    self.check()?;
    Ok(Validated(self))
  }
}

fn required(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Invalid(format!("`{field}` is required")));
  }
  Ok(())
}

fn email(value: &str) -> Result<()> {
  required("email", value)?;
  let valid = value
    .trim()
    .split_once('@')
    .is_some_and(|(local, domain)| {
      !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
    });
  if !valid {
    return Err(Error::Invalid(format!("`{value}` is not an e-mail address")));
  }
  Ok(())
}

// ─── Drafts ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewManager {
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  #[serde(default)]
  pub phone:      String,
  pub region:     String,
}

impl Draft for NewManager {
  fn check(&self) -> Result<()> {
    required("first_name", &self.first_name)?;
    required("last_name", &self.last_name)?;
    email(&self.email)?;
    required("region", &self.region)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTechnician {
  pub first_name:   String,
  pub last_name:    String,
  pub email:        String,
  #[serde(default)]
  pub phone:        String,
  pub specialty:    String,
  #[serde(default = "default_availability")]
  pub availability: Availability,
  #[serde(default)]
  pub manager_id:   Option<ManagerId>,
}

fn default_availability() -> Availability { Availability::Available }

impl Draft for NewTechnician {
  fn check(&self) -> Result<()> {
    required("first_name", &self.first_name)?;
    required("last_name", &self.last_name)?;
    email(&self.email)?;
    required("specialty", &self.specialty)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSite {
  pub name:        String,
  pub address:     String,
  pub region:      String,
  pub coordinates: Coordinates,
  pub manager_id:  ManagerId,
}

impl Draft for NewSite {
  fn check(&self) -> Result<()> {
    required("name", &self.name)?;
    required("address", &self.address)?;
    required("region", &self.region)?;
    if !self.coordinates.is_valid() {
      return Err(Error::Invalid(format!(
        "coordinates out of range: {}, {}",
        self.coordinates.latitude, self.coordinates.longitude
      )));
    }
    Ok(())
  }
}

/// A fault declaration, optionally pre-assigned to a technician.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIntervention {
  pub site_id:       SiteId,
  pub fault_type:    FaultType,
  #[serde(default)]
  pub priority:      Priority,
  pub declared_at:   DateTime<Utc>,
  pub description:   String,
  #[serde(default)]
  pub notes:         String,
  #[serde(default)]
  pub technician_id: Option<TechnicianId>,
  #[serde(default)]
  pub scheduled_at:  Option<DateTime<Utc>>,
  #[serde(default)]
  pub comment:       Option<String>,
}

impl NewIntervention {
  pub fn new(
    site_id: SiteId,
    fault_type: FaultType,
    declared_at: DateTime<Utc>,
    description: impl Into<String>,
  ) -> Self {
    Self {
      site_id,
      fault_type,
      priority: Priority::default(),
      declared_at,
      description: description.into(),
      notes: String::new(),
      technician_id: None,
      scheduled_at: None,
      comment: None,
    }
  }

  pub fn priority(mut self, priority: Priority) -> Self {
    self.priority = priority;
    self
  }

  pub fn notes(mut self, notes: impl Into<String>) -> Self {
    self.notes = notes.into();
    self
  }

  pub fn preassign(mut self, assignment: Assignment) -> Self {
    self.technician_id = Some(assignment.technician);
    self.scheduled_at = Some(assignment.scheduled_at);
    self.comment = assignment.comment;
    self
  }

  /// The pre-assignment, if the draft carries a complete one.
  pub fn assignment(&self) -> Option<Assignment> {
    Some(Assignment {
      technician:   self.technician_id?,
      scheduled_at: self.scheduled_at?,
      comment:      self.comment.clone(),
    })
  }
}

impl Draft for NewIntervention {
  fn check(&self) -> Result<()> {
    required("description", &self.description)?;
    if let FaultType::Other(label) = &self.fault_type {
      required("fault_type", label)?;
    }
    match (self.technician_id, self.scheduled_at) {
      (Some(_), None) => Err(Error::Invalid(
        "a pre-assigned technician needs a scheduled date".into(),
      )),
      (None, Some(_)) => Err(Error::Invalid(
        "a scheduled date needs a pre-assigned technician".into(),
      )),
      (Some(_), Some(at)) if at < self.declared_at => Err(Error::Invalid(
        "the scheduled date precedes the declaration".into(),
      )),
      _ => Ok(()),
    }
  }
}

/// One draft of any kind, as submitted by a creation form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum NewEntity {
  Manager(NewManager),
  Technician(NewTechnician),
  Site(NewSite),
  Intervention(NewIntervention),
}

impl Draft for NewEntity {
  fn check(&self) -> Result<()> {
    match self {
      Self::Manager(d) => d.check(),
      Self::Technician(d) => d.check(),
      Self::Site(d) => d.check(),
      Self::Intervention(d) => d.check(),
    }
  }
}
