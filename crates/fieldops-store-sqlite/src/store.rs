//! [`SqliteStore`], the SQLite implementation of [`FieldStore`].

use std::path::Path;

use chrono::Utc;
use fieldops_core::{
  audit::DeletionRecord,
  intervention::Intervention,
  manager::Manager,
  site::Site,
  store::FieldStore,
  technician::Technician,
};
use serde::de::DeserializeOwned;

use crate::{
  Result,
  encode::{
    RawDeletion, decode_body, encode_body, encode_dt, encode_entity_ref, encode_id, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A FieldOps store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read every `body` of `table`, ordered by id.
  async fn fetch_bodies<T: DeserializeOwned>(
    &self,
    table: &'static str,
    key: &'static str,
  ) -> Result<Vec<T>> {
    let bodies: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!("SELECT body FROM {table} ORDER BY {key}"))?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    bodies.iter().map(|b| decode_body(b)).collect()
  }
}

// ─── FieldStore impl ─────────────────────────────────────────────────────────

impl FieldStore for SqliteStore {
  type Error = crate::Error;

  // ── Loads ─────────────────────────────────────────────────────────────

  async fn fetch_managers(&self) -> Result<Vec<Manager>> {
    self.fetch_bodies("managers", "manager_id").await
  }

  async fn fetch_technicians(&self) -> Result<Vec<Technician>> {
    self.fetch_bodies("technicians", "technician_id").await
  }

  async fn fetch_sites(&self) -> Result<Vec<Site>> {
    self.fetch_bodies("sites", "site_id").await
  }

  async fn fetch_interventions(&self) -> Result<Vec<Intervention>> {
    self.fetch_bodies("interventions", "intervention_id").await
  }

  async fn fetch_deletions(&self) -> Result<Vec<DeletionRecord>> {
    let raws: Vec<RawDeletion> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT audit_id, target_kind, target_id, reason, recorded_at
           FROM deletions ORDER BY recorded_at",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawDeletion {
              audit_id:    row.get(0)?,
              target_kind: row.get(1)?,
              target_id:   row.get(2)?,
              reason:      row.get(3)?,
              recorded_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDeletion::into_record).collect()
  }

  // ── Saves (upserts) ───────────────────────────────────────────────────

  async fn save_manager(&self, manager: Manager) -> Result<Manager> {
    let id_val      = encode_id(manager.id.0);
    let body_str    = encode_body(&manager)?;
    let deleted_str = manager.deleted.as_ref().map(|d| encode_dt(d.deleted_at));
    let now_str     = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO managers (manager_id, body, deleted_at, updated_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(manager_id) DO UPDATE SET
             body = excluded.body,
             deleted_at = excluded.deleted_at,
             updated_at = excluded.updated_at",
          rusqlite::params![id_val, body_str, deleted_str, now_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(manager)
  }

  async fn save_technician(&self, technician: Technician) -> Result<Technician> {
    let id_val           = encode_id(technician.id.0);
    let body_str         = encode_body(&technician)?;
    let specialty_str    = technician.specialty.clone();
    let availability_str = technician.availability.wire_name();
    let deleted_str      = technician.deleted.as_ref().map(|d| encode_dt(d.deleted_at));
    let now_str          = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO technicians
             (technician_id, body, specialty, availability, deleted_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT(technician_id) DO UPDATE SET
             body = excluded.body,
             specialty = excluded.specialty,
             availability = excluded.availability,
             deleted_at = excluded.deleted_at,
             updated_at = excluded.updated_at",
          rusqlite::params![
            id_val,
            body_str,
            specialty_str,
            availability_str,
            deleted_str,
            now_str
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(technician_id = %technician.id, "technician saved");
    Ok(technician)
  }

  async fn save_site(&self, site: Site) -> Result<Site> {
    let id_val      = encode_id(site.id.0);
    let body_str    = encode_body(&site)?;
    let manager_val = encode_id(site.manager_id.0);
    let deleted_str = site.deleted.as_ref().map(|d| encode_dt(d.deleted_at));
    let now_str     = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sites (site_id, body, manager_id, deleted_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(site_id) DO UPDATE SET
             body = excluded.body,
             manager_id = excluded.manager_id,
             deleted_at = excluded.deleted_at,
             updated_at = excluded.updated_at",
          rusqlite::params![id_val, body_str, manager_val, deleted_str, now_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(site)
  }

  async fn save_intervention(&self, intervention: Intervention) -> Result<Intervention> {
    let id_val         = encode_id(intervention.id.0);
    let body_str       = encode_body(&intervention)?;
    let status_str     = intervention.status.wire_name();
    let technician_val = intervention.technician.map(|t| encode_id(t.0));
    let version_val    = encode_id(intervention.version);
    let now_str        = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO interventions
             (intervention_id, body, status, technician_id, version, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT(intervention_id) DO UPDATE SET
             body = excluded.body,
             status = excluded.status,
             technician_id = excluded.technician_id,
             version = excluded.version,
             updated_at = excluded.updated_at",
          rusqlite::params![
            id_val,
            body_str,
            status_str,
            technician_val,
            version_val,
            now_str
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      intervention_id = %intervention.id,
      version = intervention.version,
      status = intervention.status.wire_name(),
      "intervention saved"
    );
    Ok(intervention)
  }

  async fn record_deletion(&self, record: DeletionRecord) -> Result<()> {
    let audit_str      = encode_uuid(record.audit_id);
    let (kind, target) = encode_entity_ref(record.target);
    let reason_str     = encode_body(&record.reason)?;
    let at_str         = encode_dt(record.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO deletions (audit_id, target_kind, target_id, reason, recorded_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![audit_str, kind, target, reason_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(entity = %record.target, "deletion recorded");
    Ok(())
  }
}
