//! Contracts for the collaborators the core depends on.
//!
//! [`FieldStore`] is the persistence boundary (implemented by
//! `fieldops-store-sqlite`); [`Notifier`] delivers notifications. Higher
//! layers depend on these abstractions, not on a concrete backend.

use std::future::Future;

use crate::{
  audit::DeletionRecord,
  event::Notification,
  intervention::Intervention,
  manager::Manager,
  site::Site,
  technician::Technician,
};

/// Abstraction over a FieldOps persistence backend.
///
/// Saves are upserts keyed by the record id; the in-memory
/// [`EntityStore`](crate::EntityStore) owns id allocation.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait FieldStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Loads ─────────────────────────────────────────────────────────────

  fn fetch_managers(
    &self,
  ) -> impl Future<Output = Result<Vec<Manager>, Self::Error>> + Send + '_;

  fn fetch_technicians(
    &self,
  ) -> impl Future<Output = Result<Vec<Technician>, Self::Error>> + Send + '_;

  fn fetch_sites(&self) -> impl Future<Output = Result<Vec<Site>, Self::Error>> + Send + '_;

  fn fetch_interventions(
    &self,
  ) -> impl Future<Output = Result<Vec<Intervention>, Self::Error>> + Send + '_;

  fn fetch_deletions(
    &self,
  ) -> impl Future<Output = Result<Vec<DeletionRecord>, Self::Error>> + Send + '_;

  // ── Saves ─────────────────────────────────────────────────────────────

  fn save_manager(
    &self,
    manager: Manager,
  ) -> impl Future<Output = Result<Manager, Self::Error>> + Send + '_;

  fn save_technician(
    &self,
    technician: Technician,
  ) -> impl Future<Output = Result<Technician, Self::Error>> + Send + '_;

  fn save_site(&self, site: Site) -> impl Future<Output = Result<Site, Self::Error>> + Send + '_;

  fn save_intervention(
    &self,
    intervention: Intervention,
  ) -> impl Future<Output = Result<Intervention, Self::Error>> + Send + '_;

  /// Append an entry to the deletion audit log.
  fn record_deletion(
    &self,
    record: DeletionRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Delivers notifications (e-mail, push, …) to people.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send_notification(
    &self,
    notification: Notification,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
