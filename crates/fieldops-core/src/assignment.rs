//! Assignment resolver: technician filtering and ticket assignment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  ids::{InterventionId, TechnicianId},
  intervention::{Intervention, Status},
  lifecycle::{Transition, apply_transition},
  technician::{Availability, Technician},
};

// ─── Filtering ───────────────────────────────────────────────────────────────

/// Optional criteria for narrowing a technician list. An empty filter
/// matches everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicianFilter {
  /// Compared case-insensitively, ignoring surrounding whitespace.
  pub specialty:    Option<String>,
  pub availability: Option<Availability>,
}

impl TechnicianFilter {
  pub fn matches(&self, technician: &Technician) -> bool {
    let specialty_ok = self.specialty.as_deref().is_none_or(|wanted| {
      technician.specialty.trim().to_lowercase() == wanted.trim().to_lowercase()
    });
    let availability_ok = self
      .availability
      .is_none_or(|wanted| technician.availability == wanted);
    specialty_ok && availability_ok
  }
}

/// Keep the candidates matching `filter`, in their original order. An empty
/// result is a normal outcome.
pub fn filter_technicians<'a>(
  candidates: impl IntoIterator<Item = &'a Technician>,
  filter: &TechnicianFilter,
) -> Vec<&'a Technician> {
  candidates.into_iter().filter(|t| filter.matches(t)).collect()
}

// ─── Assignment ──────────────────────────────────────────────────────────────

/// What the dispatcher chose for a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
  pub technician:   TechnicianId,
  pub scheduled_at: DateTime<Utc>,
  #[serde(default)]
  pub comment:      Option<String>,
}

/// Outcome of [`assign`] or [`reassign`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assigned {
  pub intervention_id: InterventionId,
  pub technician:      TechnicianId,
  pub previous:        Option<TechnicianId>,
  /// `None` when an in-progress ticket only changed hands.
  pub transition:      Option<Transition>,
}

fn ensure_available(technician: &Technician) -> Result<()> {
  if !technician.is_assignable() {
    return Err(Error::TechnicianUnavailable(technician.id));
  }
  Ok(())
}

fn apply(
  intervention: &mut Intervention,
  technician: &Technician,
  assignment: Assignment,
) -> Result<Assigned> {
  // Work on a copy so a failure leaves the record untouched.
  let mut next = intervention.clone();
  let previous = next.technician.replace(technician.id);
  next.scheduled_at = Some(assignment.scheduled_at);
  next.comment = assignment.comment.filter(|c| !c.trim().is_empty());

  let transition = match next.status {
    Status::Unresolved => Some(apply_transition(&mut next, Status::InProgress, None)?),
    Status::InProgress => {
      next.bump();
      None
    }
    Status::Resolved => {
      return Err(Error::InvalidTransition {
        from: Status::Resolved,
        to:   Status::InProgress,
      });
    }
  };

  *intervention = next;
  Ok(Assigned {
    intervention_id: intervention.id,
    technician: technician.id,
    previous,
    transition,
  })
}

/// Assign an unassigned ticket and move it to `InProgress`.
///
/// `assignment.technician` must be `technician.id`.
pub fn assign(
  intervention: &mut Intervention,
  technician: &Technician,
  assignment: Assignment,
) -> Result<Assigned> {
  if intervention.status != Status::Unresolved {
    return Err(Error::InterventionAlreadyAssigned(intervention.id));
  }
  ensure_available(technician)?;
  apply(intervention, technician, assignment)
}

/// Hand a ticket to another technician, or assign it if it has none.
/// Same rules as [`assign`] without the initial-state check; a resolved
/// ticket still cannot be reassigned.
pub fn reassign(
  intervention: &mut Intervention,
  technician: &Technician,
  assignment: Assignment,
) -> Result<Assigned> {
  ensure_available(technician)?;
  apply(intervention, technician, assignment)
}
