//! Report finalizer.
//!
//! A technician's report is accepted once, on a resolved ticket, and freezes
//! the record's free-text fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  ids::{InterventionId, TechnicianId},
  intervention::{Intervention, Status},
};

/// Emitted when a report is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSubmitted {
  pub intervention_id: InterventionId,
  pub technician:      Option<TechnicianId>,
  pub submitted_at:    DateTime<Utc>,
}

/// Attach `report_text` to a resolved intervention.
///
/// Fails with [`Error::NotResolved`] before resolution and with
/// [`Error::ReportAlreadySubmitted`] on any second attempt; an existing
/// report is never overwritten.
pub fn submit_report(
  intervention: &mut Intervention,
  report_text: &str,
  submitted_at: DateTime<Utc>,
) -> Result<ReportSubmitted> {
  if intervention.status != Status::Resolved {
    return Err(Error::NotResolved(intervention.id));
  }
  if intervention.report.is_some() {
    return Err(Error::ReportAlreadySubmitted(intervention.id));
  }
  let text = report_text.trim();
  if text.is_empty() {
    return Err(Error::Invalid("the report text is empty".into()));
  }

  intervention.report = Some(text.to_string());
  intervention.bump();

  Ok(ReportSubmitted {
    intervention_id: intervention.id,
    technician: intervention.technician,
    submitted_at,
  })
}
