//! Error types for `fieldops-core`.

use thiserror::Error;

use crate::{
  ids::{InterventionId, ManagerId, SiteId, TechnicianId},
  intervention::Status,
};

/// A precondition that must hold before a transition can be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
  /// `InProgress` requires an assigned technician.
  Technician,
  /// `Resolved` requires a resolution timestamp.
  ResolvedAt,
  /// `Resolved` requires a scheduled date to measure the duration from.
  ScheduledAt,
  /// The resolution timestamp is earlier than the scheduled date.
  ResolvedBeforeScheduled,
}

impl std::fmt::Display for Prerequisite {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let text = match self {
      Self::Technician => "a technician must be assigned",
      Self::ResolvedAt => "a resolution timestamp is required",
      Self::ScheduledAt => "the intervention has no scheduled date",
      Self::ResolvedBeforeScheduled => {
        "the resolution timestamp precedes the scheduled date"
      }
    };
    f.write_str(text)
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot move an intervention from {from:?} to {to:?}")]
  InvalidTransition { from: Status, to: Status },

  #[error("missing prerequisite: {0}")]
  MissingPrerequisite(Prerequisite),

  #[error("technician {0} is on leave and cannot be assigned")]
  TechnicianUnavailable(TechnicianId),

  #[error("intervention {0} is already assigned")]
  InterventionAlreadyAssigned(InterventionId),

  #[error("intervention {0} is not resolved yet")]
  NotResolved(InterventionId),

  #[error("a report was already submitted for intervention {0}")]
  ReportAlreadySubmitted(InterventionId),

  #[error("intervention {0} is finalized and can no longer be edited")]
  RecordFinalized(InterventionId),

  #[error(
    "intervention {id} changed since it was loaded (expected version \
     {expected}, found {actual})"
  )]
  StaleOperation {
    id:       InterventionId,
    expected: u64,
    actual:   u64,
  },

  #[error("submission for intervention {0} was cancelled")]
  Cancelled(InterventionId),

  #[error("intervention not found: {0}")]
  InterventionNotFound(InterventionId),

  #[error("technician not found: {0}")]
  TechnicianNotFound(TechnicianId),

  #[error("manager not found: {0}")]
  ManagerNotFound(ManagerId),

  #[error("site not found: {0}")]
  SiteNotFound(SiteId),

  #[error("invalid record: {0}")]
  Invalid(String),

  #[error("persistence error: {0}")]
  Persistence(String),
}

impl Error {
  /// Stable machine-readable code, one per variant.
  pub fn code(&self) -> &'static str {
    match self {
      Self::InvalidTransition { .. } => "INVALID_TRANSITION",
      Self::MissingPrerequisite(_) => "MISSING_PREREQUISITE",
      Self::TechnicianUnavailable(_) => "TECHNICIAN_UNAVAILABLE",
      Self::InterventionAlreadyAssigned(_) => "INTERVENTION_ALREADY_ASSIGNED",
      Self::NotResolved(_) => "NOT_RESOLVED",
      Self::ReportAlreadySubmitted(_) => "REPORT_ALREADY_SUBMITTED",
      Self::RecordFinalized(_) => "RECORD_FINALIZED",
      Self::StaleOperation { .. } => "STALE_OPERATION",
      Self::Cancelled(_) => "CANCELLED",
      Self::InterventionNotFound(_) => "INTERVENTION_NOT_FOUND",
      Self::TechnicianNotFound(_) => "TECHNICIAN_NOT_FOUND",
      Self::ManagerNotFound(_) => "MANAGER_NOT_FOUND",
      Self::SiteNotFound(_) => "SITE_NOT_FOUND",
      Self::Invalid(_) => "INVALID",
      Self::Persistence(_) => "PERSISTENCE",
    }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::InterventionNotFound(_)
        | Self::TechnicianNotFound(_)
        | Self::ManagerNotFound(_)
        | Self::SiteNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
