//! A small, deterministic dataset for demos and tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::{
  EntityStore, Result,
  assignment::Assignment,
  builder::{Draft, NewIntervention, NewManager, NewSite, NewTechnician},
  ids::{ManagerId, TechnicianId},
  intervention::{DetailsPatch, FaultType, Priority, Status},
  site::Coordinates,
  technician::Availability,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
  pub managers:      usize,
  pub technicians:   usize,
  pub sites:         usize,
  pub interventions: usize,
}

const MANAGERS: &[(&str, &str, &str)] = &[
  ("Karim", "Haddad", "Ouest"),
  ("Amel", "Saidi", "Centre"),
  ("Nadir", "Belkacem", "Est"),
];

// first name, last name, specialty, availability, manager index
const TECHNICIANS: &[(&str, &str, &str, Availability, usize)] = &[
  ("Yacine", "Mansouri", "Réseaux", Availability::Available, 0),
  ("Lina", "Cherif", "Énergie", Availability::Available, 0),
  ("Sofiane", "Khelifi", "Transmission", Availability::Busy, 1),
  ("Meriem", "Zerrouki", "Réseaux", Availability::Available, 1),
  ("Walid", "Hamidi", "Énergie", Availability::OnLeave, 2),
  ("Sarah", "Bouzid", "Réseaux", Availability::Available, 2),
];

// name, address, region, latitude, longitude, manager index
const SITES: &[(&str, &str, &str, f64, f64, usize)] = &[
  ("Site Oran Centre", "12 boulevard de la Soummam, Oran", "Ouest", 35.6971, -0.6308, 0),
  ("Site Tlemcen Nord", "Route de Mansourah, Tlemcen", "Ouest", 34.8828, -1.3167, 0),
  ("Site Alger Port", "3 rue d'Angkor, Alger", "Centre", 36.7763, 3.0585, 1),
  ("Site Blida Gare", "Place de la gare, Blida", "Centre", 36.4700, 2.8277, 1),
  ("Site Constantine Ville", "Avenue Aouati Mostefa, Constantine", "Est", 36.3650, 6.6147, 2),
];

fn base() -> DateTime<Utc> {
  Utc
    .with_ymd_and_hms(2023, 5, 15, 8, 0, 0)
    .single()
    .unwrap_or_default()
}

fn email(first: &str, last: &str) -> String {
  format!("{}.{}@fieldops.example", first.to_lowercase(), last.to_lowercase())
    .replace(' ', "")
}

/// Fill an empty store with managers, technicians, sites and interventions in
/// every lifecycle state. Everything goes through the store's own validated
/// operations.
pub fn seed(store: &mut EntityStore) -> Result<SeedSummary> {
  let mut managers = Vec::new();
  for (first, last, region) in MANAGERS {
    let draft = NewManager {
      first_name: first.to_string(),
      last_name:  last.to_string(),
      email:      email(first, last),
      phone:      "+213 21 00 00 00".into(),
      region:     region.to_string(),
    };
    managers.push(store.create_manager(draft.validate()?)?.id);
  }
  let manager = |i: usize| -> ManagerId { managers[i % managers.len()] };

  let mut technicians = Vec::new();
  for (first, last, specialty, availability, m) in TECHNICIANS {
    let draft = NewTechnician {
      first_name:   first.to_string(),
      last_name:    last.to_string(),
      email:        email(first, last),
      phone:        "+213 550 00 00 00".into(),
      specialty:    specialty.to_string(),
      availability: *availability,
      manager_id:   Some(manager(*m)),
    };
    technicians.push(store.create_technician(draft.validate()?)?.id);
  }
  let technician = |i: usize| -> TechnicianId { technicians[i % technicians.len()] };

  let mut sites = Vec::new();
  for (name, address, region, latitude, longitude, m) in SITES {
    let draft = NewSite {
      name:        name.to_string(),
      address:     address.to_string(),
      region:      region.to_string(),
      coordinates: Coordinates { latitude: *latitude, longitude: *longitude },
      manager_id:  manager(*m),
    };
    sites.push(store.create_site(draft.validate()?)?.id);
  }

  let t0 = base();
  let faults = [
    (FaultType::Power, Priority::High, "Coupure secteur"),
    (FaultType::Transmission, Priority::Critical, "Lien micro-onde coupé"),
    (FaultType::Radio, Priority::Normal, "Secteur 2 hors service"),
    (FaultType::Cooling, Priority::Normal, "Climatisation en panne"),
    (FaultType::Power, Priority::Low, "Alarme batterie faible"),
    (FaultType::Other("Intrusion".into()), Priority::High, "Porte du shelter forcée"),
    (FaultType::Radio, Priority::High, "VSWR élevé sur antenne"),
    (FaultType::Transmission, Priority::Normal, "Perte de synchronisation"),
  ];

  let mut declared = 0;
  for (n, (fault, priority, description)) in faults.into_iter().enumerate() {
    let declared_at = t0 + Duration::hours(3 * n as i64);
    let draft = NewIntervention::new(sites[n % sites.len()], fault, declared_at, description)
      .priority(priority);
    let id = store.declare_intervention(draft.validate()?)?.id;
    declared += 1;

    // 0-1 unresolved, 2-3 in progress, 4-5 resolved, 6-7 resolved with report
    if n < 2 {
      continue;
    }
    // Technician 4 is on leave; skip it.
    let tech = technician(if n % 6 == 4 { n + 1 } else { n % 6 });
    let scheduled_at = declared_at + Duration::hours(2);
    store.assign(id, None, Assignment {
      technician: tech,
      scheduled_at,
      comment: Some("Prévoir l'accès au shelter".into()),
    })?;
    if n < 4 {
      continue;
    }
    store.update_details(id, None, DetailsPatch {
      actions_taken: Some("Diagnostic sur site et remplacement du module".into()),
      material_used: Some("Module de rechange".into()),
      ..Default::default()
    })?;
    let resolved_at = scheduled_at + Duration::minutes(45 + 30 * (n as i64 - 4));
    store.transition(id, None, Status::Resolved, Some(resolved_at))?;
    if n >= 6 {
      store.submit_report(
        id,
        None,
        "Intervention terminée, site rétabli et alarmes acquittées.",
        resolved_at + Duration::minutes(30),
      )?;
    }
  }

  tracing::debug!(interventions = declared, "seeded demo dataset");

  Ok(SeedSummary {
    managers:      managers.len(),
    technicians:   technicians.len(),
    sites:         sites.len(),
    interventions: declared,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seed_covers_every_state() {
    let mut store = EntityStore::default();
    let summary = seed(&mut store).unwrap();

    assert_eq!(summary.managers, 3);
    assert_eq!(summary.technicians, 6);
    assert_eq!(summary.sites, 5);
    assert_eq!(summary.interventions, 8);

    let counts = store.summary();
    assert_eq!((counts.unresolved, counts.in_progress, counts.resolved), (2, 2, 4));
    assert_eq!(store.interventions().filter(|i| i.is_finalized()).count(), 2);
  }

  #[test]
  fn seed_never_assigns_technicians_on_leave() {
    let mut store = EntityStore::default();
    seed(&mut store).unwrap();
    for i in store.interventions() {
      if let Some(t) = i.technician {
        assert_ne!(store.technician(t).unwrap().availability, Availability::OnLeave);
      }
    }
  }
}
