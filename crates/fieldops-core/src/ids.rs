//! Integer identifiers for every entity kind.
//!
//! Each kind gets its own newtype so an intervention id can never be passed
//! where a technician id is expected.

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub u64);

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
      }
    }

    impl std::str::FromStr for $name {
      type Err = std::num::ParseIntError;

      fn from_str(s: &str) -> Result<Self, Self::Err> { s.parse().map(Self) }
    }
  };
}

entity_id!(
  /// Identifies an [`Intervention`](crate::intervention::Intervention).
  InterventionId
);
entity_id!(
  /// Identifies a [`Technician`](crate::technician::Technician).
  TechnicianId
);
entity_id!(
  /// Identifies a [`Manager`](crate::manager::Manager).
  ManagerId
);
entity_id!(
  /// Identifies a [`Site`](crate::site::Site).
  SiteId
);

/// A typed reference to any soft-deletable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
  Manager(ManagerId),
  Technician(TechnicianId),
  Site(SiteId),
}

impl std::fmt::Display for EntityRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Manager(id) => write!(f, "manager {id}"),
      Self::Technician(id) => write!(f, "technician {id}"),
      Self::Site(id) => write!(f, "site {id}"),
    }
  }
}
