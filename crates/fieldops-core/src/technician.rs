//! Technicians: field workers assigned to interventions.

use serde::{Deserialize, Serialize};

use crate::{
  audit::SoftDeletion,
  ids::{ManagerId, TechnicianId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
  Available,
  Busy,
  OnLeave,
}

impl Availability {
  pub const ALL: [Self; 3] = [Self::Available, Self::Busy, Self::OnLeave];

  /// Accepts both the wire form (`on_leave`) and the display label
  /// (`En congé`), case-insensitively.
  pub fn parse(s: &str) -> Option<Self> {
    let needle = s.trim().to_lowercase();
    Self::ALL.into_iter().find(|a| {
      needle == a.wire_name() || needle == crate::display::availability_label(*a).to_lowercase()
    })
  }

  pub fn wire_name(self) -> &'static str {
    match self {
      Self::Available => "available",
      Self::Busy => "busy",
      Self::OnLeave => "on_leave",
    }
  }
}

/// A technician record. The number of open interventions is not stored here;
/// ask [`EntityStore::active_intervention_count`](crate::EntityStore::active_intervention_count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technician {
  pub id:           TechnicianId,
  pub first_name:   String,
  pub last_name:    String,
  pub email:        String,
  pub phone:        String,
  pub specialty:    String,
  pub availability: Availability,
  pub manager_id:   Option<ManagerId>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted:      Option<SoftDeletion>,
}

impl Technician {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  pub fn is_deleted(&self) -> bool { self.deleted.is_some() }

  /// Whether the technician may receive a new assignment.
  pub fn is_assignable(&self) -> bool {
    !self.is_deleted() && self.availability != Availability::OnLeave
  }
}
