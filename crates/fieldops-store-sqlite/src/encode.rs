//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings and
//! records compact JSON.

use chrono::{DateTime, Utc};
use fieldops_core::{
  audit::DeletionRecord,
  ids::{EntityRef, ManagerId, SiteId, TechnicianId},
};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Ids ─────────────────────────────────────────────────────────────────────

/// SQLite integers are signed; ids above `i64::MAX` are never allocated.
pub fn encode_id(id: u64) -> i64 { id as i64 }

pub fn decode_id(raw: i64, table: &'static str) -> Result<u64> {
  u64::try_from(raw).map_err(|_| Error::InvalidId(raw, table))
}

pub fn encode_entity_ref(target: EntityRef) -> (&'static str, i64) {
  match target {
    EntityRef::Manager(id) => ("manager", encode_id(id.0)),
    EntityRef::Technician(id) => ("technician", encode_id(id.0)),
    EntityRef::Site(id) => ("site", encode_id(id.0)),
  }
}

pub fn decode_entity_ref(kind: &str, raw: i64) -> Result<EntityRef> {
  let id = decode_id(raw, "deletions")?;
  match kind {
    "manager" => Ok(EntityRef::Manager(ManagerId(id))),
    "technician" => Ok(EntityRef::Technician(TechnicianId(id))),
    "site" => Ok(EntityRef::Site(SiteId(id))),
    other => Err(Error::UnknownKind(other.to_owned())),
  }
}

// ─── Bodies ──────────────────────────────────────────────────────────────────

pub fn encode_body<T: Serialize>(record: &T) -> Result<String> {
  Ok(serde_json::to_string(record)?)
}

pub fn decode_body<T: DeserializeOwned>(s: &str) -> Result<T> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `deletions` row.
pub struct RawDeletion {
  pub audit_id:    String,
  pub target_kind: String,
  pub target_id:   i64,
  pub reason:      String,
  pub recorded_at: String,
}

impl RawDeletion {
  pub fn into_record(self) -> Result<DeletionRecord> {
    Ok(DeletionRecord {
      audit_id:    decode_uuid(&self.audit_id)?,
      target:      decode_entity_ref(&self.target_kind, self.target_id)?,
      reason:      decode_body(&self.reason)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
