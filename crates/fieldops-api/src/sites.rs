//! Handlers for `/sites` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/sites` | Soft-deleted sites hidden |
//! | `POST` | `/sites` | Body: a site draft; the manager must exist |
//! | `GET`  | `/sites/{id}` | 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use fieldops_core::{
  builder::{Draft, NewEntity, NewSite},
  ids::SiteId,
  site::Site,
  store::FieldStore,
};

use crate::{ApiState, error::ApiError};

/// `GET /sites`
pub async fn list<S: FieldStore>(State(state): State<ApiState<S>>) -> Json<Vec<Site>> {
  Json(state.console.read(|s| s.sites().cloned().collect()).await)
}

/// `GET /sites/{id}`
pub async fn get_one<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
) -> Result<Json<Site>, ApiError> {
  let site = state.console.read(|s| s.site(SiteId(id)).cloned()).await?;
  Ok(Json(site))
}

/// `POST /sites`
pub async fn create<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewSite>,
) -> Result<impl IntoResponse, ApiError> {
  let created = state.console.create(NewEntity::Site(body).validate()?).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;
  use serde_json::json;

  use crate::test_helpers::{get, json, send, state, with_json};

  fn draft(manager_id: u64, latitude: f64) -> serde_json::Value {
    json!({
      "name": "Site Béjaïa Port",
      "address": "Boulevard de la Soummam, Béjaïa",
      "region": "Est",
      "coordinates": { "latitude": latitude, "longitude": 5.0843 },
      "manager_id": manager_id,
    })
  }

  #[tokio::test]
  async fn site_with_unknown_manager_is_404() {
    let resp = send(&state(), with_json("POST", "/sites", draft(42, 36.75))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(resp).await["code"], "MANAGER_NOT_FOUND");
  }

  #[tokio::test]
  async fn out_of_range_coordinates_are_rejected() {
    let resp = send(&state(), with_json("POST", "/sites", draft(1, 123.0))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn created_site_is_listed() {
    let state = state();
    let resp = send(&state, with_json("POST", "/sites", draft(3, 36.75))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = json(resp).await["id"].as_u64().unwrap();

    let resp = send(&state, get(&format!("/sites/{id}"))).await;
    assert_eq!(json(resp).await["name"], "Site Béjaïa Port");
    let all = json(send(&state, get("/sites")).await).await;
    assert_eq!(all.as_array().unwrap().len(), 6);
  }
}
