//! fieldops-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, loads it into memory and serves the REST API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use fieldops_api::ApiState;
use fieldops_core::{EntityStore, console, demo, store::FieldStore};
use fieldops_server::{LogNotifier, ServerConfig, stop_delivery};
use fieldops_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "FieldOps intervention console server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Load the demo data set if the store is empty.
  #[arg(long)]
  seed_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("FIELDOPS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  // Open SQLite store and load it.
  let backend = Arc::new(
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?,
  );
  let mut entities = EntityStore::hydrate(backend.as_ref())
    .await
    .context("failed to load records")?;

  if (cli.seed_demo || server_cfg.seed_demo) && entities.is_empty() {
    let summary = demo::seed(&mut entities).context("failed to seed demo data")?;
    entities.drain_events();
    persist_all(backend.as_ref(), &entities).await?;
    tracing::info!(?summary, "demo data seeded");
  }

  tracing::info!(summary = ?entities.summary(), "records loaded");

  // Console and notification delivery.
  let latency = Duration::from_millis(server_cfg.submission_latency_ms);
  let (console, notifications) = console::Console::new(entities, backend, latency);
  let delivery_cancel = CancellationToken::new();
  let delivery = tokio::spawn(console::deliver_notifications(
    notifications,
    LogNotifier,
    delivery_cancel.clone(),
  ));

  let state = ApiState {
    console:           Arc::new(console),
    organization_name: Arc::from(server_cfg.organization_name.as_str()),
  };
  let app = fieldops_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  stop_delivery(delivery, &delivery_cancel, Duration::from_secs(5)).await;
  tracing::info!("shutdown complete");

  Ok(())
}

/// Write a freshly seeded store through to the backend.
async fn persist_all(backend: &SqliteStore, entities: &EntityStore) -> anyhow::Result<()> {
  for m in entities.managers() {
    backend.save_manager(m.clone()).await?;
  }
  for t in entities.technicians(&Default::default()) {
    backend.save_technician(t.clone()).await?;
  }
  for s in entities.sites() {
    backend.save_site(s.clone()).await?;
  }
  for i in entities.interventions() {
    backend.save_intervention(i.clone()).await?;
  }
  Ok(())
}

async fn shutdown_signal() {
  match tokio::signal::ctrl_c().await {
    Ok(()) => tracing::info!("received Ctrl-C, shutting down"),
    Err(e) => {
      tracing::error!(error = %e, "failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
