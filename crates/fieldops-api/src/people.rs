//! Handlers for `/managers` and `/technicians` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/managers` | Soft-deleted managers hidden |
//! | `POST` | `/managers` | Body: a manager draft |
//! | `GET`  | `/managers/{id}` | 404 if not found |
//! | `GET`  | `/technicians` | Optional `?specialty=&availability=` |
//! | `POST` | `/technicians` | Body: a technician draft |
//! | `GET`  | `/technicians/{id}` | Includes the active intervention count |
//! | `PUT`  | `/technicians/{id}/availability` | Body: `{"availability":"on_leave"}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use fieldops_core::{
  assignment::TechnicianFilter,
  builder::{Draft, NewEntity, NewManager, NewTechnician},
  display::TechnicianView,
  ids::{ManagerId, TechnicianId},
  manager::Manager,
  store::FieldStore,
  technician::Availability,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── Managers ────────────────────────────────────────────────────────────────

/// `GET /managers`
pub async fn list_managers<S: FieldStore>(State(state): State<ApiState<S>>) -> Json<Vec<Manager>> {
  Json(state.console.read(|s| s.managers().cloned().collect()).await)
}

/// `GET /managers/{id}`
pub async fn get_manager<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
) -> Result<Json<Manager>, ApiError> {
  let manager = state.console.read(|s| s.manager(ManagerId(id)).cloned()).await?;
  Ok(Json(manager))
}

/// `POST /managers`
pub async fn create_manager<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewManager>,
) -> Result<impl IntoResponse, ApiError> {
  let created = state.console.create(NewEntity::Manager(body).validate()?).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

// ─── Technicians ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TechnicianParams {
  pub specialty:    Option<String>,
  /// Wire name (`on_leave`) or display label (`En congé`).
  pub availability: Option<String>,
}

impl TechnicianParams {
  fn into_filter(self) -> Result<TechnicianFilter, ApiError> {
    let availability = match self.availability.as_deref().map(str::trim) {
      None | Some("") => None,
      Some(raw) => Some(
        Availability::parse(raw)
          .ok_or_else(|| ApiError::BadRequest(format!("unknown availability {raw:?}")))?,
      ),
    };
    Ok(TechnicianFilter {
      specialty: self.specialty.filter(|s| !s.trim().is_empty()),
      availability,
    })
  }
}

/// `GET /technicians[?specialty=<s>&availability=<a>]`
pub async fn list_technicians<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<TechnicianParams>,
) -> Result<Json<Vec<TechnicianView>>, ApiError> {
  let filter = params.into_filter()?;
  let views = state
    .console
    .read(|s| {
      s.technicians(&filter)
        .into_iter()
        .map(|t| TechnicianView::new(s, t))
        .collect()
    })
    .await;
  Ok(Json(views))
}

/// `GET /technicians/{id}`
pub async fn get_technician<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
) -> Result<Json<TechnicianView>, ApiError> {
  let view = state
    .console
    .read(|s| s.technician(TechnicianId(id)).map(|t| TechnicianView::new(s, t)))
    .await?;
  Ok(Json(view))
}

/// `POST /technicians`
pub async fn create_technician<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewTechnician>,
) -> Result<impl IntoResponse, ApiError> {
  let created = state.console.create(NewEntity::Technician(body).validate()?).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityBody {
  pub availability: Availability,
}

/// `PUT /technicians/{id}/availability`
pub async fn set_availability<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
  Json(body): Json<AvailabilityBody>,
) -> Result<Json<TechnicianView>, ApiError> {
  let id = TechnicianId(id);
  state.console.set_availability(id, body.availability).await?;
  let view = state
    .console
    .read(|s| s.technician(id).map(|t| TechnicianView::new(s, t)))
    .await?;
  Ok(Json(view))
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;
  use serde_json::json;

  use crate::test_helpers::{get, json, send, state, with_json};

  #[tokio::test]
  async fn technicians_filter_by_specialty_and_label() {
    let state = state();
    let resp = send(&state, get("/technicians?specialty=r%C3%A9seaux&availability=Disponible")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json(resp).await;
    let rows = body.as_array().unwrap();
    assert!(!rows.is_empty());
    for row in rows {
      assert_eq!(row["specialty"], "Réseaux");
      assert_eq!(row["availability"], "available");
      assert!(row["active_intervention_count"].is_u64());
    }
  }

  #[tokio::test]
  async fn unknown_availability_is_a_bad_request() {
    let resp = send(&state(), get("/technicians?availability=sleeping")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn missing_technician_is_404_with_code() {
    let resp = send(&state(), get("/technicians/999")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(resp).await["code"], "TECHNICIAN_NOT_FOUND");
  }

  #[tokio::test]
  async fn invalid_manager_draft_is_rejected() {
    let body = json!({
      "first_name": "Rania",
      "last_name": "Meziane",
      "email": "pas-une-adresse",
      "region": "Sud",
    });
    let resp = send(&state(), with_json("POST", "/managers", body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(resp).await["code"], "INVALID");
  }

  #[tokio::test]
  async fn manager_is_created_with_next_id() {
    let state = state();
    let body = json!({
      "first_name": "Rania",
      "last_name": "Meziane",
      "email": "rania.meziane@fieldops.example",
      "region": "Sud",
    });
    let resp = send(&state, with_json("POST", "/managers", body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json(resp).await;
    assert_eq!(created["entity"], "manager");
    assert_eq!(created["id"], 4);
  }

  #[tokio::test]
  async fn availability_update_is_visible() {
    let state = state();
    let resp = send(
      &state,
      with_json("PUT", "/technicians/1/availability", json!({ "availability": "on_leave" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await["availability_label"], "En congé");
  }
}
