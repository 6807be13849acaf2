//! Soft deletion and its audit trail.
//!
//! Records are never physically removed. A deletion marks the record, hides it
//! from listings, and produces a [`DeletionRecord`] for the audit log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, ids::EntityRef};

/// Why a record was removed. Free text is carried only by [`Self::Other`],
/// where it is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", content = "detail", rename_all = "snake_case")]
pub enum DeletionReason {
  Resignation,
  Retirement,
  Termination,
  Other(String),
}

impl DeletionReason {
  pub fn validate(&self) -> Result<()> {
    match self {
      Self::Other(text) if text.trim().is_empty() => Err(Error::Invalid(
        "a deletion reason of type `other` needs an explanation".into(),
      )),
      _ => Ok(()),
    }
  }

  pub fn label(&self) -> String {
    match self {
      Self::Resignation => "Démission".to_string(),
      Self::Retirement => "Retraite".to_string(),
      Self::Termination => "Licenciement".to_string(),
      Self::Other(text) => format!("Autre : {}", text.trim()),
    }
  }
}

/// Marker stored on a soft-deleted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDeletion {
  pub audit_id:   Uuid,
  pub reason:     DeletionReason,
  pub deleted_at: DateTime<Utc>,
}

/// One entry of the deletion audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionRecord {
  pub audit_id:    Uuid,
  pub target:      EntityRef,
  pub reason:      DeletionReason,
  pub recorded_at: DateTime<Utc>,
}

impl DeletionRecord {
  pub fn new(target: EntityRef, reason: DeletionReason, at: DateTime<Utc>) -> Self {
    Self { audit_id: Uuid::new_v4(), target, reason, recorded_at: at }
  }

  pub fn marker(&self) -> SoftDeletion {
    SoftDeletion {
      audit_id:   self.audit_id,
      reason:     self.reason.clone(),
      deleted_at: self.recorded_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use assert_matches::assert_matches;

  use super::*;

  #[test]
  fn closed_reasons_need_no_text() {
    assert!(DeletionReason::Resignation.validate().is_ok());
    assert!(DeletionReason::Retirement.validate().is_ok());
    assert!(DeletionReason::Termination.validate().is_ok());
  }

  #[test]
  fn other_requires_text() {
    assert_matches!(
      DeletionReason::Other("   ".into()).validate(),
      Err(Error::Invalid(_))
    );
    assert!(DeletionReason::Other("mutation".into()).validate().is_ok());
  }

  #[test]
  fn reason_serialises_with_code_and_detail() {
    let json = serde_json::to_value(DeletionReason::Other("x".into())).unwrap();
    assert_eq!(json, serde_json::json!({ "code": "other", "detail": "x" }));

    let json = serde_json::to_value(DeletionReason::Retirement).unwrap();
    assert_eq!(json, serde_json::json!({ "code": "retirement" }));
  }
}
