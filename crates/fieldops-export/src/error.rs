//! Error types for the export renderers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("PDF error: {0}")]
  Pdf(#[from] printpdf::Error),

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("workbook archive error: {0}")]
  Zip(#[from] zip::result::ZipError),

  #[error("a table has {found} cells in row {row}, expected {expected}")]
  RaggedRow {
    row:      usize,
    expected: usize,
    found:    usize,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
