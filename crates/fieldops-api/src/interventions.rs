//! Handlers for `/interventions` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/interventions` | Filter, sort and page via query parameters |
//! | `POST`  | `/interventions` | Declare a fault, optionally pre-assigned |
//! | `GET`   | `/interventions/{id}` | `ETag: "v<version>"` |
//! | `PATCH` | `/interventions/{id}` | Update text fields until the report is in |
//! | `POST`  | `/interventions/{id}/assign` | Body: an assignment |
//! | `POST`  | `/interventions/{id}/reassign` | Body: an assignment |
//! | `POST`  | `/interventions/{id}/transition` | Body: `{"to":"resolved","at":"…"}` |
//! | `POST`  | `/interventions/{id}/report` | Body: `{"text":"…"}` |
//! | `POST`  | `/interventions/{id}/cancel` | Cancel the pending submission |
//!
//! Every write honours `If-Match`; a stale tag yields `412`.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use fieldops_core::{
  assignment::Assignment,
  builder::{Draft, NewEntity, NewIntervention},
  display::InterventionView,
  entity_store::{Action, Created},
  ids::InterventionId,
  intervention::{DetailsPatch, Intervention, Status},
  query::{InterventionQuery, Page},
  store::FieldStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError, version};

async fn respond<S: FieldStore>(
  state: &ApiState<S>,
  status: StatusCode,
  intervention: &Intervention,
) -> Response {
  let view = state.console.read(|s| InterventionView::new(s, intervention)).await;
  (status, [(header::ETAG, version::etag(intervention.version))], Json(view)).into_response()
}

async fn submit<S: FieldStore>(
  state: &ApiState<S>,
  headers: &HeaderMap,
  id: u64,
  action: Action,
) -> Result<Response, ApiError> {
  let id = InterventionId(id);
  let updated = match version::if_match(headers)? {
    Some(v) => state.console.submit_versioned(id, v, action).await?,
    None => state.console.submit(id, action).await?,
  };
  Ok(respond(state, StatusCode::OK, &updated).await)
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /interventions[?status=&technician=&site=&text=&sort=&descending=&page=&per_page=]`
pub async fn list<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Query(query): Query<InterventionQuery>,
) -> Json<Page<InterventionView>> {
  let page = state
    .console
    .read(|s| s.query_interventions(&query).map(|i| InterventionView::new(s, i)))
    .await;
  Json(page)
}

/// `GET /interventions/{id}`
pub async fn get_one<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
) -> Result<Response, ApiError> {
  let intervention = state
    .console
    .read(|s| s.intervention(InterventionId(id)).cloned())
    .await?;
  Ok(respond(&state, StatusCode::OK, &intervention).await)
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// `POST /interventions`
pub async fn declare<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewIntervention>,
) -> Result<Response, ApiError> {
  match state.console.create(NewEntity::Intervention(body).validate()?).await? {
    Created::Intervention(i) => Ok(respond(&state, StatusCode::CREATED, &i).await),
    other => Err(ApiError::BadRequest(format!("unexpected record {other:?}"))),
  }
}

/// `PATCH /interventions/{id}`
pub async fn update_details<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
  headers: HeaderMap,
  Json(patch): Json<DetailsPatch>,
) -> Result<Response, ApiError> {
  if patch.is_empty() {
    return Err(ApiError::BadRequest("empty patch".into()));
  }
  submit(&state, &headers, id, Action::UpdateDetails(patch)).await
}

/// `POST /interventions/{id}/assign`
pub async fn assign<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
  headers: HeaderMap,
  Json(body): Json<Assignment>,
) -> Result<Response, ApiError> {
  submit(&state, &headers, id, Action::Assign(body)).await
}

/// `POST /interventions/{id}/reassign`
pub async fn reassign<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
  headers: HeaderMap,
  Json(body): Json<Assignment>,
) -> Result<Response, ApiError> {
  submit(&state, &headers, id, Action::Reassign(body)).await
}

#[derive(Debug, Deserialize)]
pub struct TransitionBody {
  pub to: Status,
  /// Resolution time; required when `to` is `resolved`.
  #[serde(default)]
  pub at: Option<DateTime<Utc>>,
}

/// `POST /interventions/{id}/transition`
pub async fn transition<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
  headers: HeaderMap,
  Json(body): Json<TransitionBody>,
) -> Result<Response, ApiError> {
  submit(&state, &headers, id, Action::Transition { to: body.to, at: body.at }).await
}

#[derive(Debug, Deserialize)]
pub struct ReportBody {
  pub text: String,
}

/// `POST /interventions/{id}/report`
pub async fn submit_report<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
  headers: HeaderMap,
  Json(body): Json<ReportBody>,
) -> Result<Response, ApiError> {
  submit(&state, &headers, id, Action::SubmitReport { text: body.text }).await
}

#[derive(Debug, Serialize)]
pub struct CancelOutcome {
  pub cancelled: bool,
}

/// `POST /interventions/{id}/cancel`
pub async fn cancel<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
) -> Json<CancelOutcome> {
  let cancelled = state.console.cancel(InterventionId(id)).await;
  Json(CancelOutcome { cancelled })
}
