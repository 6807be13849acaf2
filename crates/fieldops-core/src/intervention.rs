//! Interventions: fault tickets tracked from declaration to report.
//!
//! Mutation goes through [`crate::lifecycle`], [`crate::assignment`] and
//! [`crate::report`]; nothing outside those modules writes `status`,
//! `technician`, `resolved_at` or `report`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  ids::{InterventionId, TechnicianId},
  site::SiteRef,
};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
  Unresolved,
  InProgress,
  Resolved,
}

impl Status {
  pub const ALL: [Self; 3] = [Self::Unresolved, Self::InProgress, Self::Resolved];

  /// Accepts the wire form (`in_progress`) or the display label (`En cours`).
  pub fn parse(s: &str) -> Option<Self> {
    let needle = s.trim().to_lowercase();
    Self::ALL.into_iter().find(|st| {
      needle == st.wire_name() || needle == crate::display::status_label(*st).to_lowercase()
    })
  }

  pub fn wire_name(self) -> &'static str {
    match self {
      Self::Unresolved => "unresolved",
      Self::InProgress => "in_progress",
      Self::Resolved => "resolved",
    }
  }
}

// ─── Classification ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
  Low,
  #[default]
  Normal,
  High,
  Critical,
}

/// The category of a reported fault. Unknown categories are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultType {
  Power,
  Transmission,
  Radio,
  Cooling,
  Other(String),
}

impl FaultType {
  pub fn label(&self) -> &str {
    match self {
      Self::Power => "Panne d'alimentation",
      Self::Transmission => "Panne de transmission",
      Self::Radio => "Panne radio",
      Self::Cooling => "Panne de climatisation",
      Self::Other(text) => text,
    }
  }
}

// ─── Free-text details ───────────────────────────────────────────────────────

/// Technician-editable text. Frozen once a report is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionDetails {
  pub description:   String,
  pub actions_taken: String,
  pub material_used: String,
  pub notes:         String,
}

/// A partial update of [`InterventionDetails`]; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsPatch {
  pub description:   Option<String>,
  pub actions_taken: Option<String>,
  pub material_used: Option<String>,
  pub notes:         Option<String>,
}

impl DetailsPatch {
  pub fn is_empty(&self) -> bool {
    self.description.is_none()
      && self.actions_taken.is_none()
      && self.material_used.is_none()
      && self.notes.is_none()
  }
}

// ─── Intervention ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
  pub id:                 InterventionId,
  /// Captured at declaration; never updated.
  pub site:               SiteRef,
  pub fault_type:         FaultType,
  pub priority:           Priority,
  pub declared_at:        DateTime<Utc>,
  pub scheduled_at:       Option<DateTime<Utc>>,
  /// Set if and only if `status == Resolved`.
  pub resolved_at:        Option<DateTime<Utc>>,
  /// Whole minutes between `scheduled_at` and `resolved_at`.
  pub resolution_minutes: Option<i64>,
  pub technician:         Option<TechnicianId>,
  pub status:             Status,
  /// Free-text comment left at assignment time.
  pub comment:            Option<String>,
  pub details:            InterventionDetails,
  /// Only ever set on a resolved intervention; immutable once set.
  pub report:             Option<String>,
  /// Incremented on every successful mutation.
  pub version:            u64,
}

impl Intervention {
  pub fn progress(&self) -> u8 { crate::display::progress(self.status) }

  /// A finalized record has a submitted report and frozen text fields.
  pub fn is_finalized(&self) -> bool { self.report.is_some() }

  /// Reject the operation if the caller's view of the record is outdated.
  pub fn check_version(&self, expected: Option<u64>) -> Result<()> {
    match expected {
      Some(expected) if expected != self.version => Err(Error::StaleOperation {
        id: self.id,
        expected,
        actual: self.version,
      }),
      _ => Ok(()),
    }
  }

  /// Apply a text patch. Fails once the record is finalized.
  pub fn update_details(&mut self, patch: DetailsPatch) -> Result<()> {
    if self.is_finalized() {
      return Err(Error::RecordFinalized(self.id));
    }
    let details = &mut self.details;
    if let Some(v) = patch.description {
      details.description = v;
    }
    if let Some(v) = patch.actions_taken {
      details.actions_taken = v;
    }
    if let Some(v) = patch.material_used {
      details.material_used = v;
    }
    if let Some(v) = patch.notes {
      details.notes = v;
    }
    self.bump();
    Ok(())
  }

  pub(crate) fn bump(&mut self) { self.version += 1; }
}

#[cfg(test)]
pub(crate) mod test_helpers {
  use chrono::TimeZone;

  use super::*;
  use crate::{
    ids::SiteId,
    site::{Coordinates, SiteRef},
  };

  pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 5, 16, h, m, 0).unwrap()
  }

  pub fn unresolved(id: u64) -> Intervention {
    Intervention {
      id:                 InterventionId(id),
      site:               SiteRef {
        site_id:     SiteId(1),
        name:        "Site Oran Centre".into(),
        address:     "12 boulevard de l'ALN, Oran".into(),
        coordinates: Coordinates { latitude: 35.69, longitude: -0.63 },
      },
      fault_type:         FaultType::Power,
      priority:           Priority::Normal,
      declared_at:        at(9, 0),
      scheduled_at:       None,
      resolved_at:        None,
      resolution_minutes: None,
      technician:         None,
      status:             Status::Unresolved,
      comment:            None,
      details:            InterventionDetails {
        description: "Coupure secteur".into(),
        ..Default::default()
      },
      report:             None,
      version:            0,
    }
  }

  pub fn in_progress(id: u64, technician: u64) -> Intervention {
    Intervention {
      technician: Some(TechnicianId(technician)),
      scheduled_at: Some(at(14, 0)),
      status: Status::InProgress,
      ..unresolved(id)
    }
  }
}
