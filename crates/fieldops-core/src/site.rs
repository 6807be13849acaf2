//! Sites: physical mobile network installations.

use serde::{Deserialize, Serialize};

use crate::{
  audit::SoftDeletion,
  ids::{ManagerId, SiteId},
};

/// WGS84 position of a site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub latitude:  f64,
  pub longitude: f64,
}

impl Coordinates {
  pub fn is_valid(&self) -> bool {
    (-90.0..=90.0).contains(&self.latitude)
      && (-180.0..=180.0).contains(&self.longitude)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
  pub id:          SiteId,
  pub name:        String,
  pub address:     String,
  pub region:      String,
  pub coordinates: Coordinates,
  /// Weak reference; the manager may since have been soft-deleted.
  pub manager_id:  ManagerId,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted:     Option<SoftDeletion>,
}

impl Site {
  pub fn is_deleted(&self) -> bool { self.deleted.is_some() }

  /// The read-only snapshot embedded in an intervention.
  pub fn to_ref(&self) -> SiteRef {
    SiteRef {
      site_id:     self.id,
      name:        self.name.clone(),
      address:     self.address.clone(),
      coordinates: self.coordinates,
    }
  }
}

/// The part of a [`Site`] an intervention captures at declaration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRef {
  pub site_id:     SiteId,
  pub name:        String,
  pub address:     String,
  pub coordinates: Coordinates,
}
