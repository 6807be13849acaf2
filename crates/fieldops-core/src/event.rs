//! Lifecycle events and the notifications derived from them.
//!
//! The core only raises notifications; delivery belongs to a
//! [`Notifier`](crate::store::Notifier).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{InterventionId, ManagerId, TechnicianId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
  Assigned {
    intervention_id: InterventionId,
    technician:      TechnicianId,
    scheduled_at:    DateTime<Utc>,
  },
  Reopened {
    intervention_id: InterventionId,
  },
  Resolved {
    intervention_id: InterventionId,
    technician:      Option<TechnicianId>,
    resolved_at:     DateTime<Utc>,
  },
  ReportSubmitted {
    intervention_id: InterventionId,
    /// Owner of the intervention's site.
    manager:         ManagerId,
    submitted_at:    DateTime<Utc>,
  },
}

impl LifecycleEvent {
  pub fn intervention_id(&self) -> InterventionId {
    match self {
      Self::Assigned { intervention_id, .. }
      | Self::Reopened { intervention_id }
      | Self::Resolved { intervention_id, .. }
      | Self::ReportSubmitted { intervention_id, .. } => *intervention_id,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Recipient {
  Manager(ManagerId),
  Technician(TechnicianId),
}

/// A message for a person, ready to hand to a notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: Uuid,
  pub recipient:       Recipient,
  /// Contact address resolved at raise time, when known.
  pub email:           Option<String>,
  pub subject:         String,
  pub body:            String,
  pub intervention_id: InterventionId,
  pub raised_at:       DateTime<Utc>,
}
