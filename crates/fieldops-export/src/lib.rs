//! PDF and spreadsheet export for FieldOps tables.
//!
//! Renders [`Table`]s built by [`fieldops_core::display`] so exported
//! documents show exactly what the console shows. Pure synchronous; no HTTP
//! or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use fieldops_core::{EntityStore, display::{self, TableKind}};
//! use fieldops_export::{ExportFormat, ExportOptions, render_document};
//!
//! let store = EntityStore::default();
//! let table = display::table(&store, TableKind::Interventions);
//! let doc = render_document(&[table], ExportFormat::Pdf, &ExportOptions::new("FieldOps")).unwrap();
//! std::fs::write("interventions.pdf", doc.into_bytes().unwrap()).unwrap();
//! ```

pub mod error;
mod layout;
mod pdf;
mod sheet;

use chrono::{DateTime, Utc};
use fieldops_core::display::Table;
use serde::{Deserialize, Serialize};

pub use error::{Error, Result};
pub use layout::{DEFAULT_ROWS_PER_PAGE, EMPTY_NOTICE};

// ─── Public types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
  Pdf,
  Spreadsheet,
}

impl ExportFormat {
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pdf" => Some(Self::Pdf),
      "spreadsheet" | "csv" | "xlsx" | "excel" => Some(Self::Spreadsheet),
      _ => None,
    }
  }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
  /// Printed in every PDF header and footer.
  pub organization_name: String,
  pub generated_at:      DateTime<Utc>,
  pub rows_per_page:     usize,
}

impl ExportOptions {
  pub fn new(organization_name: impl Into<String>) -> Self {
    Self {
      organization_name: organization_name.into(),
      generated_at:      Utc::now(),
      rows_per_page:     DEFAULT_ROWS_PER_PAGE,
    }
  }
}

/// One CSV-encoded sheet of a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
  pub name: String,
  pub csv:  Vec<u8>,
}

impl Sheet {
  /// Entry name inside a multi-sheet archive.
  pub fn file_name(&self) -> String { format!("{}.csv", self.name.to_lowercase()) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedDocument {
  Pdf(Vec<u8>),
  /// One sheet per table, in input order.
  Workbook(Vec<Sheet>),
}

impl RenderedDocument {
  /// A workbook with exactly one sheet downloads as that sheet's CSV; any
  /// other workbook downloads as a zip archive of sheets.
  fn is_single_sheet(&self) -> bool {
    matches!(self, Self::Workbook(sheets) if sheets.len() == 1)
  }

  pub fn content_type(&self) -> &'static str {
    match self {
      Self::Pdf(_) => "application/pdf",
      Self::Workbook(_) if self.is_single_sheet() => "text/csv; charset=utf-8",
      Self::Workbook(_) => "application/zip",
    }
  }

  pub fn extension(&self) -> &'static str {
    match self {
      Self::Pdf(_) => "pdf",
      Self::Workbook(_) if self.is_single_sheet() => "csv",
      Self::Workbook(_) => "zip",
    }
  }

  /// The document as a single byte stream, matching [`content_type`].
  ///
  /// [`content_type`]: Self::content_type
  pub fn into_bytes(self) -> Result<Vec<u8>> {
    match self {
      Self::Pdf(bytes) => Ok(bytes),
      Self::Workbook(mut sheets) if sheets.len() == 1 => {
        Ok(sheets.pop().map(|s| s.csv).unwrap_or_default())
      }
      Self::Workbook(sheets) => sheet::archive(sheets),
    }
  }
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Render `tables` as one document. Never fails on empty input: zero rows or
/// zero tables still produce a valid document.
pub fn render_document(
  tables: &[Table],
  format: ExportFormat,
  options: &ExportOptions,
) -> Result<RenderedDocument> {
  for table in tables {
    layout::check_shape(table)?;
  }
  match format {
    ExportFormat::Pdf => pdf::render(tables, options).map(RenderedDocument::Pdf),
    ExportFormat::Spreadsheet => sheet::render(tables).map(RenderedDocument::Workbook),
  }
}

#[cfg(test)]
mod tests {
  use assert_matches::assert_matches;
  use fieldops_core::{
    EntityStore, demo,
    display::{self, TableKind},
  };

  use super::*;

  fn seeded() -> EntityStore {
    let mut store = EntityStore::default();
    demo::seed(&mut store).unwrap();
    store
  }

  fn empty_table() -> Table {
    display::table(&EntityStore::default(), TableKind::Interventions)
  }

  #[test]
  fn empty_pdf_is_a_valid_document() {
    let doc = render_document(&[empty_table()], ExportFormat::Pdf, &ExportOptions::new("FieldOps"))
      .unwrap();
    assert_eq!(doc.content_type(), "application/pdf");
    assert!(doc.into_bytes().unwrap().starts_with(b"%PDF"));
  }

  #[test]
  fn no_tables_still_renders_a_pdf() {
    let doc = render_document(&[], ExportFormat::Pdf, &ExportOptions::new("FieldOps")).unwrap();
    assert!(doc.into_bytes().unwrap().starts_with(b"%PDF"));
  }

  #[test]
  fn seeded_tables_render_to_pdf() {
    let store = seeded();
    let tables: Vec<Table> = [TableKind::Interventions, TableKind::Technicians]
      .into_iter()
      .map(|k| display::table(&store, k))
      .collect();
    let mut options = ExportOptions::new("FieldOps Algérie");
    options.rows_per_page = 3;
    let doc = render_document(&tables, ExportFormat::Pdf, &options).unwrap();
    assert!(doc.into_bytes().unwrap().starts_with(b"%PDF"));
  }

  #[test]
  fn empty_table_is_a_header_only_sheet() {
    let doc = render_document(&[empty_table()], ExportFormat::Spreadsheet, &ExportOptions::new("x"))
      .unwrap();
    let RenderedDocument::Workbook(sheets) = doc else { panic!("not a workbook") };
    assert_eq!(sheets.len(), 1);
    let text = String::from_utf8(sheets[0].csv.clone()).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("ID,Site,Type de panne"));
  }

  #[test]
  fn no_tables_is_an_empty_workbook() {
    let doc = render_document(&[], ExportFormat::Spreadsheet, &ExportOptions::new("x")).unwrap();
    assert_eq!(doc, RenderedDocument::Workbook(vec![]));
  }

  #[test]
  fn sheet_cells_match_display_rows() {
    let store = seeded();
    let table = display::table(&store, TableKind::Interventions);
    let expected_first = table.rows[0].clone();
    let doc = render_document(&[table], ExportFormat::Spreadsheet, &ExportOptions::new("x")).unwrap();

    let bytes = doc.into_bytes().unwrap();
    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let first = reader.records().next().unwrap().unwrap();
    assert_eq!(first.iter().collect::<Vec<_>>(), expected_first);
    assert_eq!(reader.records().count(), 7);
  }

  #[test]
  fn multi_table_workbook_keeps_one_sheet_per_table() {
    use std::io::{Cursor, Read as _};

    let store = seeded();
    let tables: Vec<Table> = [TableKind::Managers, TableKind::Interventions]
      .into_iter()
      .map(|k| display::table(&store, k))
      .collect();
    let doc = render_document(&tables, ExportFormat::Spreadsheet, &ExportOptions::new("x")).unwrap();
    assert_eq!(doc.content_type(), "application/zip");
    assert_eq!(doc.extension(), "zip");

    let mut archive = zip::ZipArchive::new(Cursor::new(doc.into_bytes().unwrap())).unwrap();
    assert_eq!(archive.len(), 2);
    for table in &tables {
      let name = format!("{}.csv", table.sheet.to_lowercase());
      let mut text = String::new();
      archive.by_name(&name).unwrap().read_to_string(&mut text).unwrap();

      let mut reader = csv::Reader::from_reader(text.as_bytes());
      let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
      assert_eq!(headers, table.headers);
      let rows: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
      assert_eq!(rows, table.rows);
    }
  }

  #[test]
  fn single_sheet_downloads_as_plain_csv() {
    let doc = render_document(&[empty_table()], ExportFormat::Spreadsheet, &ExportOptions::new("x"))
      .unwrap();
    assert_eq!(doc.content_type(), "text/csv; charset=utf-8");
    assert_eq!(doc.extension(), "csv");
  }

  #[test]
  fn ragged_rows_are_rejected() {
    let mut table = empty_table();
    table.rows.push(vec!["1".into()]);
    assert_matches!(
      render_document(&[table], ExportFormat::Spreadsheet, &ExportOptions::new("x")),
      Err(Error::RaggedRow { row: 0, found: 1, .. })
    );
  }

  #[test]
  fn format_names() {
    assert_eq!(ExportFormat::parse("PDF"), Some(ExportFormat::Pdf));
    assert_eq!(ExportFormat::parse("xlsx"), Some(ExportFormat::Spreadsheet));
    assert_eq!(ExportFormat::parse("docx"), None);
  }
}
