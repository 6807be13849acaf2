//! Document downloads.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/export/{kind}?format=pdf\|spreadsheet` | One table |
//! | `GET`  | `/export?format=pdf\|spreadsheet` | Every table; a spreadsheet comes back as a zip of sheets |

use axum::{
  extract::{Path, Query, State},
  http::header,
  response::{IntoResponse, Response},
};
use fieldops_core::{
  display::{self, Table, TableKind},
  store::FieldStore,
};
use fieldops_export::{ExportFormat, ExportOptions, render_document};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
  pub format: Option<String>,
}

impl ExportParams {
  fn format(&self) -> Result<ExportFormat, ApiError> {
    match self.format.as_deref() {
      None => Ok(ExportFormat::Pdf),
      Some(raw) => ExportFormat::parse(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown format {raw:?}"))),
    }
  }
}

/// `GET /export/{kind}`
pub async fn handler<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Path(kind): Path<String>,
  Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
  let kind = TableKind::parse(&kind)
    .ok_or_else(|| ApiError::BadRequest(format!("unknown table {kind:?}")))?;
  let format = params.format()?;
  let table = state.console.read(|s| display::table(s, kind)).await;
  let file_stem = table.sheet.to_lowercase();
  download(&state, vec![table], format, &file_stem)
}

/// `GET /export`
pub async fn workbook<S: FieldStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
  let format = params.format()?;
  let tables = state
    .console
    .read(|s| Vec::from(TableKind::ALL.map(|kind| display::table(s, kind))))
    .await;
  download(&state, tables, format, "fieldops")
}

fn download<S>(
  state: &ApiState<S>,
  tables: Vec<Table>,
  format: ExportFormat,
  file_stem: &str,
) -> Result<Response, ApiError> {
  let rows: usize = tables.iter().map(|t| t.rows.len()).sum();
  let options = ExportOptions::new(state.organization_name.as_ref());
  let document = render_document(&tables, format, &options)?;

  tracing::info!(?format, tables = tables.len(), rows, "tables exported");

  let disposition = format!("attachment; filename=\"{file_stem}.{}\"", document.extension());
  let content_type = document.content_type().to_string();
  Ok(
    (
      [(header::CONTENT_TYPE, content_type), (header::CONTENT_DISPOSITION, disposition)],
      document.into_bytes()?,
    )
      .into_response(),
  )
}
