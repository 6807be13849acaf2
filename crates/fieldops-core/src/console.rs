//! The console service: serialized access to the [`EntityStore`], delayed
//! cancellable submissions, persistence and notification publishing.
//!
//! A lifecycle submission runs in four steps:
//!
//! 1. validate against the current record;
//! 2. wait out the submission latency, during which the caller (or a newer
//!    submission for the same intervention) may cancel it;
//! 3. re-validate against the record as it is *now*, at the version the
//!    caller saw, and persist through the [`FieldStore`];
//! 4. publish the notifications the change raised.
//!
//! Nothing is written unless every step succeeds.

use std::{
  collections::HashMap,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
  time::Duration,
};

use chrono::Utc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use crate::{
  EntityStore, Error, Result,
  audit::{DeletionReason, DeletionRecord},
  builder::{NewEntity, Validated},
  entity_store::{Action, Created},
  event::Notification,
  ids::{EntityRef, InterventionId, TechnicianId},
  intervention::Intervention,
  store::{FieldStore, Notifier},
  technician::{Availability, Technician},
};

pub struct Console<S> {
  state:         Mutex<EntityStore>,
  backend:       Arc<S>,
  latency:       Duration,
  inflight:      Mutex<HashMap<InterventionId, (u64, CancellationToken)>>,
  submissions:   AtomicU64,
  notifications: mpsc::UnboundedSender<Notification>,
}

impl<S: FieldStore> Console<S> {
  /// Wrap a loaded store. The returned receiver yields every notification
  /// the console raises; hand it to [`deliver_notifications`].
  pub fn new(
    store: EntityStore,
    backend: Arc<S>,
    latency: Duration,
  ) -> (Self, mpsc::UnboundedReceiver<Notification>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let console = Self {
      state: Mutex::new(store),
      backend,
      latency,
      inflight: Mutex::new(HashMap::new()),
      submissions: AtomicU64::new(0),
      notifications: tx,
    };
    (console, rx)
  }

  /// Run `f` against the current state.
  pub async fn read<R>(&self, f: impl FnOnce(&EntityStore) -> R) -> R {
    let state = self.state.lock().await;
    f(&state)
  }

  // ── Lifecycle submissions ─────────────────────────────────────────────

  /// Submit `action` against whatever version of the record is current.
  pub async fn submit(&self, id: InterventionId, action: Action) -> Result<Intervention> {
    let version = self.read(|s| s.intervention(id).map(|i| i.version)).await?;
    self.submit_versioned(id, version, action).await
  }

  /// Submit `action` on behalf of a caller that last saw version
  /// `expected_version` of the record.
  pub async fn submit_versioned(
    &self,
    id: InterventionId,
    expected_version: u64,
    action: Action,
  ) -> Result<Intervention> {
    let name = action.name();
    self
      .read(|s| {
        s.intervention(id)?.check_version(Some(expected_version))?;
        s.preview(id, &action, Utc::now())
      })
      .await?;

    let (ticket, token) = self.register(id).await;
    tracing::debug!(
      intervention_id = %id,
      action = name,
      latency_ms = self.latency.as_millis() as u64,
      "submission pending"
    );

    tokio::select! {
      _ = token.cancelled() => {}
      _ = tokio::time::sleep(self.latency) => {}
    };

    // Settled under the state lock: after `release`, `cancel` can no longer
    // reach this submission.
    let mut state = self.state.lock().await;
    if self.release(id, ticket, &token).await {
      tracing::info!(intervention_id = %id, action = name, "submission cancelled");
      return Err(Error::Cancelled(id));
    }
    let staged = state.stage(id, Some(expected_version), action, Utc::now())?;
    self
      .backend
      .save_intervention(staged.intervention().clone())
      .await
      .map_err(persistence::<S>)?;
    let updated = state.commit(staged);
    self.publish(&mut state);
    drop(state);

    tracing::info!(
      intervention_id = %id,
      action = name,
      status = ?updated.status,
      version = updated.version,
      "submission applied"
    );
    Ok(updated)
  }

  /// Cancel the pending submission for `id`. Returns `false` when there was
  /// none.
  pub async fn cancel(&self, id: InterventionId) -> bool {
    match self.inflight.lock().await.remove(&id) {
      Some((_, token)) => {
        token.cancel();
        true
      }
      None => false,
    }
  }

  async fn register(&self, id: InterventionId) -> (u64, CancellationToken) {
    let ticket = self.submissions.fetch_add(1, Ordering::Relaxed);
    let token = CancellationToken::new();
    let mut inflight = self.inflight.lock().await;
    if let Some((_, older)) = inflight.insert(id, (ticket, token.clone())) {
      tracing::debug!(intervention_id = %id, "superseding pending submission");
      older.cancel();
    }
    drop(inflight);
    (ticket, token)
  }

  /// Drop this submission's registration and report whether it was
  /// cancelled first. `cancel` and `register` flip the token while holding
  /// the same lock, so the answer is final.
  async fn release(&self, id: InterventionId, ticket: u64, token: &CancellationToken) -> bool {
    let mut inflight = self.inflight.lock().await;
    if inflight.get(&id).is_some_and(|(t, _)| *t == ticket) {
      inflight.remove(&id);
    }
    token.is_cancelled()
  }

  fn publish(&self, state: &mut EntityStore) {
    let now = Utc::now();
    for event in state.drain_events() {
      tracing::debug!(?event, "lifecycle event");
      let Some(notification) = state.notification_for(&event, now) else {
        continue;
      };
      if self.notifications.send(notification).is_err() {
        tracing::warn!(intervention_id = %event.intervention_id(), "notification channel closed");
      }
    }
  }

  // ── Administration ────────────────────────────────────────────────────

  /// Create a record of any kind and persist it.
  pub async fn create(&self, draft: Validated<NewEntity>) -> Result<Created> {
    let mut state = self.state.lock().await;
    let mut next = state.clone();
    let created = next.create(draft)?;

    match &created {
      Created::Manager(m) => self.backend.save_manager(m.clone()).await.map(drop),
      Created::Technician(t) => self.backend.save_technician(t.clone()).await.map(drop),
      Created::Site(s) => self.backend.save_site(s.clone()).await.map(drop),
      Created::Intervention(i) => self.backend.save_intervention(i.clone()).await.map(drop),
    }
    .map_err(persistence::<S>)?;

    *state = next;
    self.publish(&mut state);
    tracing::info!(?created, "record created");
    Ok(created)
  }

  pub async fn set_availability(
    &self,
    id: TechnicianId,
    availability: Availability,
  ) -> Result<Technician> {
    let mut state = self.state.lock().await;
    let mut next = state.clone();
    let technician = next.set_availability(id, availability)?;
    self
      .backend
      .save_technician(technician.clone())
      .await
      .map_err(persistence::<S>)?;
    *state = next;
    Ok(technician)
  }

  /// Soft-delete a record and append the reason to the audit log.
  pub async fn soft_delete(
    &self,
    target: EntityRef,
    reason: DeletionReason,
  ) -> Result<DeletionRecord> {
    let mut state = self.state.lock().await;
    let mut next = state.clone();
    let record = next.soft_delete(target, reason, Utc::now())?;

    let saved = match target {
      EntityRef::Manager(id) => self.backend.save_manager(next.manager(id)?.clone()).await.map(drop),
      EntityRef::Technician(id) => {
        self.backend.save_technician(next.technician(id)?.clone()).await.map(drop)
      }
      EntityRef::Site(id) => self.backend.save_site(next.site(id)?.clone()).await.map(drop),
    };
    saved.map_err(persistence::<S>)?;
    self
      .backend
      .record_deletion(record.clone())
      .await
      .map_err(persistence::<S>)?;

    *state = next;
    tracing::info!(entity = %target, reason = %record.reason.label(), "record soft-deleted");
    Ok(record)
  }
}

fn persistence<S: FieldStore>(e: S::Error) -> Error {
  tracing::error!(error = %e, "persistence failed");
  Error::Persistence(e.to_string())
}

// ─── Delivery ────────────────────────────────────────────────────────────────

/// Forward notifications to `notifier` until the channel closes or `cancel`
/// fires. Delivery failures are logged and the notification dropped.
pub async fn deliver_notifications<N: Notifier>(
  mut rx: mpsc::UnboundedReceiver<Notification>,
  notifier: N,
  cancel: CancellationToken,
) {
  tracing::info!("notification delivery started");
  loop {
    tokio::select! {
      _ = cancel.cancelled() => {
        tracing::info!("notification delivery stopping");
        break;
      }
      next = rx.recv() => {
        let Some(notification) = next else { break };
        let id = notification.notification_id;
        match notifier.send_notification(notification).await {
          Ok(()) => tracing::debug!(notification_id = %id, "notification delivered"),
          Err(e) => tracing::error!(notification_id = %id, error = %e, "notification delivery failed"),
        }
      }
    }
  }
}
