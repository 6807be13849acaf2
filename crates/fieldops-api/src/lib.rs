//! JSON REST API for the FieldOps console.
//!
//! Exposes an axum [`Router`] backed by a shared [`Console`] over any
//! [`FieldStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", fieldops_api::api_router(state.clone()))
//! ```

pub mod admin;
pub mod error;
pub mod export;
pub mod interventions;
pub mod people;
pub mod sites;
pub mod version;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use fieldops_core::{console::Console, store::FieldStore};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub console:           Arc<Console<S>>,
  /// Printed on exported documents.
  pub organization_name: Arc<str>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      console:           self.console.clone(),
      organization_name: self.organization_name.clone(),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: FieldStore + 'static,
{
  Router::new()
    // Managers
    .route("/managers", get(people::list_managers::<S>).post(people::create_manager::<S>))
    .route("/managers/{id}", get(people::get_manager::<S>))
    .route("/managers/{id}/delete", post(admin::delete_manager::<S>))
    // Technicians
    .route(
      "/technicians",
      get(people::list_technicians::<S>).post(people::create_technician::<S>),
    )
    .route("/technicians/{id}", get(people::get_technician::<S>))
    .route("/technicians/{id}/availability", put(people::set_availability::<S>))
    .route("/technicians/{id}/delete", post(admin::delete_technician::<S>))
    // Sites
    .route("/sites", get(sites::list::<S>).post(sites::create::<S>))
    .route("/sites/{id}", get(sites::get_one::<S>))
    .route("/sites/{id}/delete", post(admin::delete_site::<S>))
    // Interventions
    .route(
      "/interventions",
      get(interventions::list::<S>).post(interventions::declare::<S>),
    )
    .route(
      "/interventions/{id}",
      get(interventions::get_one::<S>).patch(interventions::update_details::<S>),
    )
    .route("/interventions/{id}/assign", post(interventions::assign::<S>))
    .route("/interventions/{id}/reassign", post(interventions::reassign::<S>))
    .route("/interventions/{id}/transition", post(interventions::transition::<S>))
    .route("/interventions/{id}/report", post(interventions::submit_report::<S>))
    .route("/interventions/{id}/cancel", post(interventions::cancel::<S>))
    // Dashboard, audit, export
    .route("/summary", get(admin::summary::<S>))
    .route("/audit", get(admin::audit::<S>))
    .route("/export", get(export::workbook::<S>))
    .route("/export/{kind}", get(export::handler::<S>))
    .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_helpers {
  use std::{
    sync::{Arc, Mutex},
    time::Duration,
  };

  use axum::{
    Router,
    body::Body,
    http::{Request, Response},
  };
  use fieldops_core::{
    EntityStore, audit::DeletionRecord, console::Console, demo, intervention::Intervention,
    manager::Manager, site::Site, store::FieldStore, technician::Technician,
  };
  use tower::ServiceExt as _;

  use super::{ApiState, api_router};

  #[derive(Debug, thiserror::Error)]
  #[error("unreachable")]
  pub struct Never;

  /// Accepts every write and remembers intervention saves.
  #[derive(Default)]
  pub struct MemoryBackend {
    pub saved: Mutex<Vec<Intervention>>,
  }

  impl FieldStore for MemoryBackend {
    type Error = Never;

    async fn fetch_managers(&self) -> Result<Vec<Manager>, Never> { Ok(vec![]) }

    async fn fetch_technicians(&self) -> Result<Vec<Technician>, Never> { Ok(vec![]) }

    async fn fetch_sites(&self) -> Result<Vec<Site>, Never> { Ok(vec![]) }

    async fn fetch_interventions(&self) -> Result<Vec<Intervention>, Never> { Ok(vec![]) }

    async fn fetch_deletions(&self) -> Result<Vec<DeletionRecord>, Never> { Ok(vec![]) }

    async fn save_manager(&self, m: Manager) -> Result<Manager, Never> { Ok(m) }

    async fn save_technician(&self, t: Technician) -> Result<Technician, Never> { Ok(t) }

    async fn save_site(&self, s: Site) -> Result<Site, Never> { Ok(s) }

    async fn save_intervention(&self, i: Intervention) -> Result<Intervention, Never> {
      self.saved.lock().unwrap().push(i.clone());
      Ok(i)
    }

    async fn record_deletion(&self, _: DeletionRecord) -> Result<(), Never> { Ok(()) }
  }

  pub fn state() -> ApiState<MemoryBackend> {
    let mut store = EntityStore::default();
    demo::seed(&mut store).unwrap();
    store.drain_events();
    let (console, _rx) = Console::new(store, Arc::new(MemoryBackend::default()), Duration::ZERO);
    ApiState {
      console:           Arc::new(console),
      organization_name: Arc::from("FieldOps"),
    }
  }

  pub fn router(state: &ApiState<MemoryBackend>) -> Router { api_router(state.clone()) }

  pub async fn send(state: &ApiState<MemoryBackend>, req: Request<Body>) -> Response<Body> {
    router(state).oneshot(req).await.unwrap()
  }

  pub async fn json(resp: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
  }

  pub fn with_json(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
      .method(method)
      .uri(uri)
      .header("content-type", "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
  }
}
