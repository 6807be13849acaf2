//! Error type for `fieldops-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A `deletions` row names an entity kind this build does not know.
  #[error("unknown entity kind: {0:?}")]
  UnknownKind(String),

  /// A stored id does not fit the domain's id type.
  #[error("invalid id {0} in table {1}")]
  InvalidId(i64, &'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
