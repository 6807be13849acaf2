//! Soft deletion, dashboard counters and the deletion audit log.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/managers/{id}/delete` | Body: `{"reason":{"code":"retirement"}}` |
//! | `POST` | `/technicians/{id}/delete` | Same body |
//! | `POST` | `/sites/{id}/delete` | Same body |
//! | `GET`  | `/summary` | Dashboard counters |
//! | `GET`  | `/audit` | Every deletion, oldest first |

use axum::{
  Json,
  extract::{Path, State},
};
use fieldops_core::{
  audit::{DeletionReason, DeletionRecord},
  entity_store::Summary,
  ids::{EntityRef, ManagerId, SiteId, TechnicianId},
  store::FieldStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct DeleteBody {
  pub reason: DeletionReason,
}

async fn delete<S: FieldStore>(
  state: &ApiState<S>,
  target: EntityRef,
  body: DeleteBody,
) -> Result<Json<DeletionRecord>, ApiError> {
  let record = state.console.soft_delete(target, body.reason).await?;
  Ok(Json(record))
}

/// `POST /managers/{id}/delete`
pub async fn delete_manager<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
  Json(body): Json<DeleteBody>,
) -> Result<Json<DeletionRecord>, ApiError> {
  delete(&state, EntityRef::Manager(ManagerId(id)), body).await
}

/// `POST /technicians/{id}/delete`
pub async fn delete_technician<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
  Json(body): Json<DeleteBody>,
) -> Result<Json<DeletionRecord>, ApiError> {
  delete(&state, EntityRef::Technician(TechnicianId(id)), body).await
}

/// `POST /sites/{id}/delete`
pub async fn delete_site<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<u64>,
  Json(body): Json<DeleteBody>,
) -> Result<Json<DeletionRecord>, ApiError> {
  delete(&state, EntityRef::Site(SiteId(id)), body).await
}

/// `GET /summary`
pub async fn summary<S: FieldStore>(State(state): State<ApiState<S>>) -> Json<Summary> {
  Json(state.console.read(|s| s.summary()).await)
}

/// `GET /audit`
pub async fn audit<S: FieldStore>(State(state): State<ApiState<S>>) -> Json<Vec<DeletionRecord>> {
  Json(state.console.read(|s| s.deletions().to_vec()).await)
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;
  use serde_json::json;

  use crate::test_helpers::{get, json, send, state, with_json};

  #[tokio::test]
  async fn deleted_technician_leaves_listings_and_enters_the_audit_log() {
    let state = state();
    let before = json(send(&state, get("/summary")).await).await["technicians"].as_u64().unwrap();

    let resp = send(
      &state,
      with_json("POST", "/technicians/2/delete", json!({ "reason": { "code": "resignation" } })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let record = json(resp).await;
    assert_eq!(record["target"], json!({ "kind": "technician", "id": 2 }));

    let after = json(send(&state, get("/summary")).await).await["technicians"].as_u64().unwrap();
    assert_eq!(after, before - 1);
    let audit = json(send(&state, get("/audit")).await).await;
    assert_eq!(audit.as_array().unwrap().len(), 1);

    let listed = json(send(&state, get("/technicians")).await).await;
    assert!(listed.as_array().unwrap().iter().all(|t| t["id"] != 2));
  }

  #[tokio::test]
  async fn other_reason_needs_text() {
    let resp = send(
      &state(),
      with_json(
        "POST",
        "/sites/1/delete",
        json!({ "reason": { "code": "other", "detail": "  " } }),
      ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn deleting_twice_is_rejected() {
    let state = state();
    let body = json!({ "reason": { "code": "retirement" } });
    let first = send(&state, with_json("POST", "/managers/3/delete", body.clone())).await;
    assert_eq!(first.status(), StatusCode::OK);
    let second = send(&state, with_json("POST", "/managers/3/delete", body)).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn summary_counts_seed_data() {
    let summary = json(send(&state(), get("/summary")).await).await;
    assert_eq!(summary["interventions"], 8);
    assert_eq!(summary["resolved"], 4);
    assert_eq!(summary["on_leave"], 1);
    assert_eq!(summary["sites"], 5);
  }
}
