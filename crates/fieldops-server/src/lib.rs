//! HTTP server wiring for the FieldOps console.
//!
//! Holds the runtime configuration, the top-level router and the notifier the
//! binary installs. The binary itself lives in `main.rs`.

use std::{convert::Infallible, path::PathBuf, time::Duration};

use axum::{Router, routing::get};
use fieldops_api::{ApiState, api_router};
use fieldops_core::{event::Notification, store::{FieldStore, Notifier}};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FIELDOPS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  #[serde(default = "default_store_path")]
  pub store_path:            PathBuf,
  #[serde(default = "default_organization")]
  pub organization_name:     String,
  /// Delay before a lifecycle submission is applied, during which it can be
  /// cancelled.
  #[serde(default)]
  pub submission_latency_ms: u64,
  /// Load the demo data set when the store is empty.
  #[serde(default)]
  pub seed_demo:             bool,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/fieldops/fieldops.db") }

fn default_organization() -> String { "FieldOps".to_string() }

// ─── Router ──────────────────────────────────────────────────────────────────

/// The full application: the REST API under `/api` plus `/health`.
pub fn router<S>(state: ApiState<S>) -> Router
where
  S: FieldStore + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

// ─── Notifier ────────────────────────────────────────────────────────────────

/// Writes every notification to the log. Stands in for an e-mail gateway.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  type Error = Infallible;

  async fn send_notification(&self, n: Notification) -> Result<(), Infallible> {
    tracing::info!(
      recipient = ?n.recipient,
      email = n.email.as_deref().unwrap_or("-"),
      intervention_id = %n.intervention_id,
      subject = %n.subject,
      "notification"
    );
    Ok(())
  }
}

// ─── Shutdown ────────────────────────────────────────────────────────────────

/// How the notification delivery task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryShutdown {
  Stopped,
  /// The task panicked or was aborted.
  Failed,
  /// Still running after the grace period.
  TimedOut,
}

/// Cancel the delivery task and wait up to `grace` for it to finish.
pub async fn stop_delivery(
  task: JoinHandle<()>,
  cancel: &CancellationToken,
  grace: Duration,
) -> DeliveryShutdown {
  cancel.cancel();
  match tokio::time::timeout(grace, task).await {
    Ok(Ok(())) => DeliveryShutdown::Stopped,
    Ok(Err(e)) => {
      tracing::warn!(error = %e, "notification delivery task failed");
      DeliveryShutdown::Failed
    }
    Err(_) => {
      tracing::warn!(
        grace_ms = grace.as_millis() as u64,
        "notification delivery did not stop in time"
      );
      DeliveryShutdown::TimedOut
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::Arc, time::Duration};

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use fieldops_core::{EntityStore, console::Console, demo};
  use fieldops_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  #[test]
  fn config_defaults_fill_missing_keys() {
    let settings = config::Config::builder()
      .set_override("port", 9000)
      .unwrap()
      .build()
      .unwrap();
    let cfg: ServerConfig = settings.try_deserialize().unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.submission_latency_ms, 0);
    assert!(!cfg.seed_demo);
  }

  #[tokio::test]
  async fn api_is_nested_under_prefix() {
    let backend = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let mut store = EntityStore::default();
    demo::seed(&mut store).unwrap();
    let (console, _rx) = Console::new(store, backend, Duration::ZERO);
    let app = router(ApiState {
      console:           Arc::new(console),
      organization_name: Arc::from("FieldOps"),
    });

    let health = Request::builder().uri("/health").body(Body::empty()).unwrap();
    assert_eq!(app.clone().oneshot(health).await.unwrap().status(), StatusCode::OK);

    let summary = Request::builder().uri("/api/summary").body(Body::empty()).unwrap();
    assert_eq!(app.oneshot(summary).await.unwrap().status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn delivery_stops_when_cancelled() {
    let (_tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let task = tokio::spawn(fieldops_core::console::deliver_notifications(
      rx,
      LogNotifier,
      cancel.clone(),
    ));
    assert_eq!(
      stop_delivery(task, &cancel, Duration::from_secs(1)).await,
      DeliveryShutdown::Stopped
    );
  }

  #[tokio::test]
  async fn delivery_failures_are_reported() {
    let cancel = CancellationToken::new();
    let panicked: JoinHandle<()> = tokio::spawn(async { panic!("delivery crashed") });
    assert_eq!(
      stop_delivery(panicked, &cancel, Duration::from_secs(1)).await,
      DeliveryShutdown::Failed
    );

    let stuck = tokio::spawn(std::future::pending::<()>());
    assert_eq!(
      stop_delivery(stuck, &cancel, Duration::from_millis(20)).await,
      DeliveryShutdown::TimedOut
    );
  }

  #[tokio::test]
  async fn log_notifier_never_fails() {
    let n = Notification {
      notification_id: Default::default(),
      recipient:       fieldops_core::event::Recipient::Manager(fieldops_core::ids::ManagerId(1)),
      email:           None,
      subject:         "s".into(),
      body:            "b".into(),
      intervention_id: fieldops_core::ids::InterventionId(1),
      raised_at:       Default::default(),
    };
    assert!(LogNotifier.send_notification(n).await.is_ok());
  }
}
