//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use fieldops_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Domain(#[from] CoreError),

  #[error("export failed: {0}")]
  Export(#[from] fieldops_export::Error),

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Domain(e) => domain_status(e),
      ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
    }
  }

  pub fn code(&self) -> &'static str {
    match self {
      ApiError::Domain(e) => e.code(),
      ApiError::Export(_) => "EXPORT_FAILED",
      ApiError::BadRequest(_) => "BAD_REQUEST",
    }
  }
}

fn domain_status(e: &CoreError) -> StatusCode {
  match e {
    _ if e.is_not_found() => StatusCode::NOT_FOUND,
    CoreError::Invalid(_) => StatusCode::BAD_REQUEST,
    CoreError::StaleOperation { .. } => StatusCode::PRECONDITION_FAILED,
    CoreError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    _ => StatusCode::CONFLICT,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string(), "code": self.code() }))).into_response()
  }
}
