//! The in-memory entity store.
//!
//! Holds every record of a console session. It is loaded once (from a
//! [`FieldStore`] or the demo seed) and then mutated only through the
//! operations below, each of which validates before it writes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  assignment::{self, Assignment, TechnicianFilter},
  audit::{DeletionReason, DeletionRecord},
  builder::{NewEntity, NewIntervention, NewManager, NewSite, NewTechnician, Validated},
  display::format_datetime,
  event::{LifecycleEvent, Notification, Recipient},
  ids::{EntityRef, InterventionId, ManagerId, SiteId, TechnicianId},
  intervention::{DetailsPatch, Intervention, InterventionDetails, Status},
  lifecycle,
  manager::Manager,
  query::{InterventionQuery, Page},
  report,
  site::Site,
  store::FieldStore,
  technician::{Availability, Technician},
};

// ─── Actions ─────────────────────────────────────────────────────────────────

/// A lifecycle operation on one intervention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
  Assign(Assignment),
  Reassign(Assignment),
  Transition {
    to: Status,
    #[serde(default)]
    at: Option<DateTime<Utc>>,
  },
  UpdateDetails(DetailsPatch),
  SubmitReport { text: String },
}

impl Action {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Assign(_) => "assign",
      Self::Reassign(_) => "reassign",
      Self::Transition { .. } => "transition",
      Self::UpdateDetails(_) => "update_details",
      Self::SubmitReport { .. } => "submit_report",
    }
  }
}

/// A record produced by [`EntityStore::create`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum Created {
  Manager(Manager),
  Technician(Technician),
  Site(Site),
  Intervention(Intervention),
}

/// A validated change to one intervention, not yet written.
#[derive(Debug, Clone)]
pub struct Staged {
  intervention: Intervention,
  events:       Vec<LifecycleEvent>,
}

impl Staged {
  pub fn intervention(&self) -> &Intervention { &self.intervention }
}

/// Dashboard counters. Soft-deleted records are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  pub interventions: usize,
  pub unresolved:    usize,
  pub in_progress:   usize,
  pub resolved:      usize,
  pub technicians:   usize,
  pub available:     usize,
  pub busy:          usize,
  pub on_leave:      usize,
  pub managers:      usize,
  pub sites:         usize,
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct EntityStore {
  managers:      BTreeMap<ManagerId, Manager>,
  technicians:   BTreeMap<TechnicianId, Technician>,
  sites:         BTreeMap<SiteId, Site>,
  interventions: BTreeMap<InterventionId, Intervention>,
  deletions:     Vec<DeletionRecord>,
  outbox:        Vec<LifecycleEvent>,
}

fn next_key<K: Ord + Copy, V>(map: &BTreeMap<K, V>, raw: impl Fn(K) -> u64) -> u64 {
  map.keys().next_back().map(|k| raw(*k) + 1).unwrap_or(1)
}

impl EntityStore {
  /// Build a store from previously persisted records.
  pub fn from_parts(
    managers: Vec<Manager>,
    technicians: Vec<Technician>,
    sites: Vec<Site>,
    interventions: Vec<Intervention>,
    deletions: Vec<DeletionRecord>,
  ) -> Self {
    Self {
      managers: managers.into_iter().map(|m| (m.id, m)).collect(),
      technicians: technicians.into_iter().map(|t| (t.id, t)).collect(),
      sites: sites.into_iter().map(|s| (s.id, s)).collect(),
      interventions: interventions.into_iter().map(|i| (i.id, i)).collect(),
      deletions,
      outbox: Vec::new(),
    }
  }

  /// Load every record from `backend`.
  pub async fn hydrate<S: FieldStore>(backend: &S) -> Result<Self> {
    let persistence = |e: S::Error| Error::Persistence(e.to_string());
    let managers = backend.fetch_managers().await.map_err(persistence)?;
    let technicians = backend.fetch_technicians().await.map_err(persistence)?;
    let sites = backend.fetch_sites().await.map_err(persistence)?;
    let interventions = backend.fetch_interventions().await.map_err(persistence)?;
    let deletions = backend.fetch_deletions().await.map_err(persistence)?;
    Ok(Self::from_parts(managers, technicians, sites, interventions, deletions))
  }

  pub fn is_empty(&self) -> bool {
    self.managers.is_empty()
      && self.technicians.is_empty()
      && self.sites.is_empty()
      && self.interventions.is_empty()
  }

  // ── Lookups (soft-deleted records included) ───────────────────────────

  pub fn manager(&self, id: ManagerId) -> Result<&Manager> {
    self.managers.get(&id).ok_or(Error::ManagerNotFound(id))
  }

  pub fn technician(&self, id: TechnicianId) -> Result<&Technician> {
    self.technicians.get(&id).ok_or(Error::TechnicianNotFound(id))
  }

  pub fn site(&self, id: SiteId) -> Result<&Site> {
    self.sites.get(&id).ok_or(Error::SiteNotFound(id))
  }

  pub fn intervention(&self, id: InterventionId) -> Result<&Intervention> {
    self.interventions.get(&id).ok_or(Error::InterventionNotFound(id))
  }

  // ── Listings (soft-deleted records hidden) ────────────────────────────

  pub fn managers(&self) -> impl Iterator<Item = &Manager> {
    self.managers.values().filter(|m| !m.is_deleted())
  }

  pub fn technicians(&self, filter: &TechnicianFilter) -> Vec<&Technician> {
    assignment::filter_technicians(
      self.technicians.values().filter(|t| !t.is_deleted()),
      filter,
    )
  }

  pub fn sites(&self) -> impl Iterator<Item = &Site> {
    self.sites.values().filter(|s| !s.is_deleted())
  }

  pub fn interventions(&self) -> impl Iterator<Item = &Intervention> {
    self.interventions.values()
  }

  pub fn query_interventions(&self, query: &InterventionQuery) -> Page<&Intervention> {
    query.run(self.interventions.values())
  }

  pub fn deletions(&self) -> &[DeletionRecord] { &self.deletions }

  /// Interventions referencing `technician` that are not resolved yet.
  /// Always derived; there is no stored counter to drift.
  pub fn active_intervention_count(&self, technician: TechnicianId) -> usize {
    self
      .interventions
      .values()
      .filter(|i| i.technician == Some(technician) && i.status != Status::Resolved)
      .count()
  }

  pub fn summary(&self) -> Summary {
    let mut summary = Summary::default();
    for i in self.interventions.values() {
      summary.interventions += 1;
      match i.status {
        Status::Unresolved => summary.unresolved += 1,
        Status::InProgress => summary.in_progress += 1,
        Status::Resolved => summary.resolved += 1,
      }
    }
    for t in self.technicians.values().filter(|t| !t.is_deleted()) {
      summary.technicians += 1;
      match t.availability {
        Availability::Available => summary.available += 1,
        Availability::Busy => summary.busy += 1,
        Availability::OnLeave => summary.on_leave += 1,
      }
    }
    summary.managers = self.managers().count();
    summary.sites = self.sites().count();
    summary
  }

  // ── Creation ──────────────────────────────────────────────────────────

  pub fn create_manager(&mut self, draft: Validated<NewManager>) -> Result<Manager> {
    let d = draft.into_inner();
    let manager = Manager {
      id:         ManagerId(next_key(&self.managers, |k| k.0)),
      first_name: d.first_name.trim().to_string(),
      last_name:  d.last_name.trim().to_string(),
      email:      d.email.trim().to_string(),
      phone:      d.phone.trim().to_string(),
      region:     d.region.trim().to_string(),
      deleted:    None,
    };
    self.managers.insert(manager.id, manager.clone());
    Ok(manager)
  }

  pub fn create_technician(&mut self, draft: Validated<NewTechnician>) -> Result<Technician> {
    let d = draft.into_inner();
    if let Some(manager_id) = d.manager_id {
      self.live_manager(manager_id)?;
    }
    let technician = Technician {
      id:           TechnicianId(next_key(&self.technicians, |k| k.0)),
      first_name:   d.first_name.trim().to_string(),
      last_name:    d.last_name.trim().to_string(),
      email:        d.email.trim().to_string(),
      phone:        d.phone.trim().to_string(),
      specialty:    d.specialty.trim().to_string(),
      availability: d.availability,
      manager_id:   d.manager_id,
      deleted:      None,
    };
    self.technicians.insert(technician.id, technician.clone());
    Ok(technician)
  }

  pub fn create_site(&mut self, draft: Validated<NewSite>) -> Result<Site> {
    let d = draft.into_inner();
    self.live_manager(d.manager_id)?;
    let site = Site {
      id:          SiteId(next_key(&self.sites, |k| k.0)),
      name:        d.name.trim().to_string(),
      address:     d.address.trim().to_string(),
      region:      d.region.trim().to_string(),
      coordinates: d.coordinates,
      manager_id:  d.manager_id,
      deleted:     None,
    };
    self.sites.insert(site.id, site.clone());
    Ok(site)
  }

  /// Declare a fault. A draft carrying a complete pre-assignment starts
  /// `InProgress`; any other starts `Unresolved`.
  pub fn declare_intervention(
    &mut self,
    draft: Validated<NewIntervention>,
  ) -> Result<Intervention> {
    let d = draft.into_inner();
    let site = self.site(d.site_id)?;
    if site.is_deleted() {
      return Err(Error::SiteNotFound(d.site_id));
    }

    let mut intervention = Intervention {
      id:                 InterventionId(next_key(&self.interventions, |k| k.0)),
      site:               site.to_ref(),
      fault_type:         d.fault_type.clone(),
      priority:           d.priority,
      declared_at:        d.declared_at,
      scheduled_at:       None,
      resolved_at:        None,
      resolution_minutes: None,
      technician:         None,
      status:             Status::Unresolved,
      comment:            None,
      details:            InterventionDetails {
        description: d.description.trim().to_string(),
        notes: d.notes.trim().to_string(),
        ..Default::default()
      },
      report:             None,
      version:            0,
    };

    let mut events = Vec::new();
    if let Some(plan) = d.assignment() {
      events = self.run_action(&mut intervention, Action::Assign(plan), d.declared_at)?;
    }

    self.interventions.insert(intervention.id, intervention.clone());
    self.outbox.extend(events);
    Ok(intervention)
  }

  /// Create a record of any kind from a validated draft.
  pub fn create(&mut self, draft: Validated<NewEntity>) -> Result<Created> {
    // Each variant's check is the inner draft's check.
    Ok(match draft.into_inner() {
      NewEntity::Manager(d) => Created::Manager(self.create_manager(Validated(d))?),
      NewEntity::Technician(d) => Created::Technician(self.create_technician(Validated(d))?),
      NewEntity::Site(d) => Created::Site(self.create_site(Validated(d))?),
      NewEntity::Intervention(d) => {
        Created::Intervention(self.declare_intervention(Validated(d))?)
      }
    })
  }

  fn live_manager(&self, id: ManagerId) -> Result<&Manager> {
    match self.manager(id)? {
      m if m.is_deleted() => Err(Error::ManagerNotFound(id)),
      m => Ok(m),
    }
  }

  fn live_technician(&self, id: TechnicianId) -> Result<&Technician> {
    match self.technician(id)? {
      t if t.is_deleted() => Err(Error::TechnicianNotFound(id)),
      t => Ok(t),
    }
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Apply `action` to `intervention` (a working copy) and return the events
  /// it raises. Lookups go through `self`; nothing in `self` is written.
  fn run_action(
    &self,
    intervention: &mut Intervention,
    action: Action,
    now: DateTime<Utc>,
  ) -> Result<Vec<LifecycleEvent>> {
    let id = intervention.id;
    match action {
      Action::Assign(plan) => {
        if intervention.status != Status::Unresolved {
          return Err(Error::InterventionAlreadyAssigned(id));
        }
        let technician = self.live_technician(plan.technician)?;
        let scheduled_at = plan.scheduled_at;
        let out = assignment::assign(intervention, technician, plan)?;
        Ok(vec![LifecycleEvent::Assigned {
          intervention_id: id,
          technician: out.technician,
          scheduled_at,
        }])
      }
      Action::Reassign(plan) => {
        let technician = self.live_technician(plan.technician)?;
        let scheduled_at = plan.scheduled_at;
        let out = assignment::reassign(intervention, technician, plan)?;
        Ok(vec![LifecycleEvent::Assigned {
          intervention_id: id,
          technician: out.technician,
          scheduled_at,
        }])
      }
      Action::Transition { to, at } => {
        let technician = intervention.technician;
        let t = lifecycle::apply_transition(intervention, to, at)?;
        Ok(match (t.to, t.resolved_at) {
          (Status::Resolved, Some(resolved_at)) => vec![LifecycleEvent::Resolved {
            intervention_id: id,
            technician,
            resolved_at,
          }],
          (Status::Unresolved, _) => vec![LifecycleEvent::Reopened { intervention_id: id }],
          _ => Vec::new(),
        })
      }
      Action::UpdateDetails(patch) => {
        intervention.update_details(patch)?;
        Ok(Vec::new())
      }
      Action::SubmitReport { text } => {
        let submitted = report::submit_report(intervention, &text, now)?;
        let manager = self.site(intervention.site.site_id)?.manager_id;
        Ok(vec![LifecycleEvent::ReportSubmitted {
          intervention_id: id,
          manager,
          submitted_at: submitted.submitted_at,
        }])
      }
    }
  }

  /// Dry-run `action` against the current record.
  pub fn preview(&self, id: InterventionId, action: &Action, now: DateTime<Utc>) -> Result<()> {
    let mut working = self.intervention(id)?.clone();
    self.run_action(&mut working, action.clone(), now).map(|_| ())
  }

  /// Compute the effect of `action` on intervention `id` without writing it.
  ///
  /// When `expected_version` is given, the record must still be at that
  /// version, otherwise [`Error::StaleOperation`]. All preconditions are
  /// checked against the record as it is now.
  pub fn stage(
    &self,
    id: InterventionId,
    expected_version: Option<u64>,
    action: Action,
    now: DateTime<Utc>,
  ) -> Result<Staged> {
    let current = self.intervention(id)?;
    current.check_version(expected_version)?;

    let mut working = current.clone();
    let events = self.run_action(&mut working, action, now)?;
    Ok(Staged { intervention: working, events })
  }

  /// Write a staged change and queue its events.
  pub fn commit(&mut self, staged: Staged) -> Intervention {
    let Staged { intervention, events } = staged;
    self.interventions.insert(intervention.id, intervention.clone());
    self.outbox.extend(events);
    intervention
  }

  /// [`stage`](Self::stage) then [`commit`](Self::commit). A failure leaves
  /// the record untouched.
  pub fn apply(
    &mut self,
    id: InterventionId,
    expected_version: Option<u64>,
    action: Action,
    now: DateTime<Utc>,
  ) -> Result<Intervention> {
    let staged = self.stage(id, expected_version, action, now)?;
    Ok(self.commit(staged))
  }

  pub fn assign(
    &mut self,
    id: InterventionId,
    expected_version: Option<u64>,
    plan: Assignment,
  ) -> Result<Intervention> {
    self.apply(id, expected_version, Action::Assign(plan), Utc::now())
  }

  pub fn reassign(
    &mut self,
    id: InterventionId,
    expected_version: Option<u64>,
    plan: Assignment,
  ) -> Result<Intervention> {
    self.apply(id, expected_version, Action::Reassign(plan), Utc::now())
  }

  pub fn transition(
    &mut self,
    id: InterventionId,
    expected_version: Option<u64>,
    to: Status,
    at: Option<DateTime<Utc>>,
  ) -> Result<Intervention> {
    self.apply(id, expected_version, Action::Transition { to, at }, Utc::now())
  }

  pub fn update_details(
    &mut self,
    id: InterventionId,
    expected_version: Option<u64>,
    patch: DetailsPatch,
  ) -> Result<Intervention> {
    self.apply(id, expected_version, Action::UpdateDetails(patch), Utc::now())
  }

  pub fn submit_report(
    &mut self,
    id: InterventionId,
    expected_version: Option<u64>,
    text: impl Into<String>,
    now: DateTime<Utc>,
  ) -> Result<Intervention> {
    self.apply(id, expected_version, Action::SubmitReport { text: text.into() }, now)
  }

  // ── Administration ────────────────────────────────────────────────────

  pub fn set_availability(
    &mut self,
    id: TechnicianId,
    availability: Availability,
  ) -> Result<Technician> {
    self.live_technician(id)?;
    let technician = self
      .technicians
      .get_mut(&id)
      .ok_or(Error::TechnicianNotFound(id))?;
    technician.availability = availability;
    Ok(technician.clone())
  }

  /// Soft-delete a manager, technician or site and log the reason.
  pub fn soft_delete(
    &mut self,
    target: EntityRef,
    reason: DeletionReason,
    at: DateTime<Utc>,
  ) -> Result<DeletionRecord> {
    reason.validate()?;
    let record = DeletionRecord::new(target, reason, at);
    let already = || Error::Invalid(format!("{target} is already deleted"));

    let slot = match target {
      EntityRef::Manager(id) => {
        &mut self.managers.get_mut(&id).ok_or(Error::ManagerNotFound(id))?.deleted
      }
      EntityRef::Technician(id) => {
        &mut self
          .technicians
          .get_mut(&id)
          .ok_or(Error::TechnicianNotFound(id))?
          .deleted
      }
      EntityRef::Site(id) => &mut self.sites.get_mut(&id).ok_or(Error::SiteNotFound(id))?.deleted,
    };
    if slot.is_some() {
      return Err(already());
    }
    *slot = Some(record.marker());

    self.deletions.push(record.clone());
    Ok(record)
  }

  // ── Events ────────────────────────────────────────────────────────────

  /// Take every event raised since the last drain, oldest first.
  pub fn drain_events(&mut self) -> Vec<LifecycleEvent> { std::mem::take(&mut self.outbox) }

  /// The notification an event calls for, if anyone must hear about it.
  pub fn notification_for(
    &self,
    event: &LifecycleEvent,
    now: DateTime<Utc>,
  ) -> Option<Notification> {
    let intervention = self.intervention(event.intervention_id()).ok()?;
    let (recipient, email, subject, body) = match event {
      LifecycleEvent::Assigned { technician, scheduled_at, .. } => {
        let t = self.technician(*technician).ok()?;
        (
          Recipient::Technician(t.id),
          Some(t.email.clone()),
          format!("Nouvelle intervention #{}", intervention.id),
          format!(
            "Bonjour {}, l'intervention #{} sur le site {} ({}) vous est assignée pour le {}.",
            t.full_name(),
            intervention.id,
            intervention.site.name,
            intervention.fault_type.label(),
            format_datetime(*scheduled_at),
          ),
        )
      }
      LifecycleEvent::ReportSubmitted { manager, .. } => {
        let email = self.manager(*manager).ok().map(|m| m.email.clone());
        (
          Recipient::Manager(*manager),
          email,
          format!("Rapport de l'intervention #{}", intervention.id),
          format!(
            "Le rapport de l'intervention #{} sur le site {} a été soumis.\n\n{}",
            intervention.id,
            intervention.site.name,
            intervention.report.as_deref().unwrap_or_default(),
          ),
        )
      }
      LifecycleEvent::Reopened { .. } | LifecycleEvent::Resolved { .. } => return None,
    };

    Some(Notification {
      notification_id: Uuid::new_v4(),
      recipient,
      email,
      subject,
      body,
      intervention_id: intervention.id,
      raised_at: now,
    })
  }
}

#[cfg(test)]
mod tests {
  use assert_matches::assert_matches;

  use super::*;
  use crate::{builder::Draft, demo, intervention::test_helpers::at};

  fn seeded() -> EntityStore {
    let mut store = EntityStore::default();
    demo::seed(&mut store).unwrap();
    store.drain_events();
    store
  }

  fn first_unresolved(store: &EntityStore) -> InterventionId {
    store
      .interventions()
      .find(|i| i.status == Status::Unresolved)
      .map(|i| i.id)
      .unwrap()
  }

  fn available_technician(store: &EntityStore) -> TechnicianId {
    store
      .technicians(&TechnicianFilter {
        availability: Some(Availability::Available),
        ..Default::default()
      })[0]
      .id
  }

  fn plan(technician: TechnicianId) -> Assignment {
    Assignment { technician, scheduled_at: at(14, 0), comment: None }
  }

  #[test]
  fn ids_are_sequential_per_kind() {
    let mut store = EntityStore::default();
    let draft = || NewManager {
      first_name: "Amel".into(),
      last_name:  "Saidi".into(),
      email:      "amel@example.dz".into(),
      phone:      String::new(),
      region:     "Centre".into(),
    };
    let a = store.create_manager(draft().validate().unwrap()).unwrap();
    let b = store.create_manager(draft().validate().unwrap()).unwrap();
    assert_eq!((a.id, b.id), (ManagerId(1), ManagerId(2)));
  }

  #[test]
  fn active_count_is_derived_from_interventions() {
    let mut store = seeded();
    let tech = available_technician(&store);
    let before = store.active_intervention_count(tech);

    let id = first_unresolved(&store);
    store.assign(id, None, plan(tech)).unwrap();
    assert_eq!(store.active_intervention_count(tech), before + 1);

    store.transition(id, None, Status::Resolved, Some(at(15, 45))).unwrap();
    assert_eq!(store.active_intervention_count(tech), before);
  }

  #[test]
  fn stale_version_is_rejected_without_mutation() {
    let mut store = seeded();
    let tech = available_technician(&store);
    let id = first_unresolved(&store);
    let seen = store.intervention(id).unwrap().version;

    store
      .update_details(id, Some(seen), DetailsPatch {
        notes: Some("clé chez le gardien".into()),
        ..Default::default()
      })
      .unwrap();

    assert_matches!(
      store.assign(id, Some(seen), plan(tech)),
      Err(Error::StaleOperation { expected, actual, .. }) if expected == seen && actual == seen + 1
    );
    assert_eq!(store.intervention(id).unwrap().status, Status::Unresolved);
  }

  #[test]
  fn assign_checks_status_before_technician() {
    let mut store = seeded();
    let tech = available_technician(&store);
    let id = first_unresolved(&store);
    store.assign(id, None, plan(tech)).unwrap();

    assert_matches!(
      store.assign(id, None, plan(TechnicianId(999))),
      Err(Error::InterventionAlreadyAssigned(_))
    );
  }

  #[test]
  fn deleted_technician_cannot_be_assigned() {
    let mut store = seeded();
    let tech = available_technician(&store);
    store
      .soft_delete(EntityRef::Technician(tech), DeletionReason::Resignation, at(8, 0))
      .unwrap();

    let id = first_unresolved(&store);
    assert_matches!(store.assign(id, None, plan(tech)), Err(Error::TechnicianNotFound(_)));
    assert!(store.technicians(&TechnicianFilter::default()).iter().all(|t| t.id != tech));
  }

  #[test]
  fn full_lifecycle_raises_events_and_notifications() {
    let mut store = seeded();
    let tech = available_technician(&store);
    let id = first_unresolved(&store);

    store.assign(id, None, plan(tech)).unwrap();
    store.transition(id, None, Status::Resolved, Some(at(15, 45))).unwrap();
    store.submit_report(id, None, "Batteries remplacées", at(16, 0)).unwrap();

    let events = store.drain_events();
    assert_eq!(events.len(), 3);
    assert_matches!(events[0], LifecycleEvent::Assigned { .. });
    assert_matches!(events[1], LifecycleEvent::Resolved { .. });
    let site_manager = store
      .site(store.intervention(id).unwrap().site.site_id)
      .unwrap()
      .manager_id;
    assert_matches!(
      events[2],
      LifecycleEvent::ReportSubmitted { manager, .. } if manager == site_manager
    );

    let note = store.notification_for(&events[2], at(16, 0)).unwrap();
    assert_eq!(note.recipient, Recipient::Manager(site_manager));
    assert!(note.body.contains("Batteries remplacées"));
    assert!(store.notification_for(&events[1], at(16, 0)).is_none());
    assert!(store.drain_events().is_empty());
  }

  #[test]
  fn preview_does_not_mutate() {
    let store = seeded();
    let tech = available_technician(&store);
    let id = first_unresolved(&store);
    let before = store.intervention(id).unwrap().clone();

    store.preview(id, &Action::Assign(plan(tech)), at(9, 0)).unwrap();
    assert_eq!(store.intervention(id).unwrap(), &before);
  }

  #[test]
  fn preassigned_declaration_starts_in_progress() {
    let mut store = seeded();
    let tech = available_technician(&store);
    let site = store.sites().next().unwrap().id;
    let draft = NewIntervention::new(site, crate::intervention::FaultType::Cooling, at(9, 0), "Clim HS")
      .preassign(plan(tech));

    let created = store.declare_intervention(draft.validate().unwrap()).unwrap();
    assert_eq!(created.status, Status::InProgress);
    assert_eq!(created.technician, Some(tech));
    assert_matches!(store.drain_events().as_slice(), [LifecycleEvent::Assigned { .. }]);
  }

  #[test]
  fn soft_delete_is_audited_once() {
    let mut store = seeded();
    let site = store.sites().next().unwrap().id;
    let before = store.summary().sites;

    let record = store
      .soft_delete(EntityRef::Site(site), DeletionReason::Other("démantelé".into()), at(8, 0))
      .unwrap();
    assert_eq!(record.target, EntityRef::Site(site));
    assert_eq!(store.summary().sites, before - 1);
    assert_eq!(store.deletions().len(), 1);

    assert_matches!(
      store.soft_delete(EntityRef::Site(site), DeletionReason::Retirement, at(8, 5)),
      Err(Error::Invalid(_))
    );
    assert_matches!(
      store.soft_delete(EntityRef::Site(site), DeletionReason::Other(String::new()), at(8, 5)),
      Err(Error::Invalid(_))
    );
    assert_eq!(store.deletions().len(), 1);
  }

  #[test]
  fn invariants_hold_over_seed_data() {
    let store = seeded();
    for i in store.interventions() {
      assert_eq!(i.resolved_at.is_some(), i.status == Status::Resolved, "#{}", i.id);
      assert!(i.report.is_none() || i.status == Status::Resolved, "#{}", i.id);
      if i.status == Status::InProgress {
        assert!(i.technician.is_some(), "#{}", i.id);
      }
    }
  }
}
