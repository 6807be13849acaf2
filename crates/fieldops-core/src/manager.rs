//! Managers ("gestionnaires") supervise a region's sites and technicians.

use serde::{Deserialize, Serialize};

use crate::{audit::SoftDeletion, ids::ManagerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manager {
  pub id:         ManagerId,
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub phone:      String,
  pub region:     String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted:    Option<SoftDeletion>,
}

impl Manager {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  pub fn is_deleted(&self) -> bool { self.deleted.is_some() }
}
