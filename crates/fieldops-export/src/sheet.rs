//! Spreadsheet renderer: one CSV sheet per table, packed into a zip archive
//! when a workbook holds more than one.

use std::io::{Cursor, Write as _};

use fieldops_core::display::Table;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{Result, Sheet};

pub(crate) fn render(tables: &[Table]) -> Result<Vec<Sheet>> {
  tables.iter().map(render_sheet).collect()
}

fn render_sheet(table: &Table) -> Result<Sheet> {
  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record(&table.headers)?;
  for row in &table.rows {
    writer.write_record(row)?;
  }
  let csv = writer.into_inner().map_err(|e| e.into_error())?;
  Ok(Sheet { name: table.sheet.clone(), csv })
}

/// Pack `sheets` into a zip archive holding one `<name>.csv` entry per
/// sheet, in order.
pub(crate) fn archive(sheets: Vec<Sheet>) -> Result<Vec<u8>> {
  let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
  let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
  for sheet in sheets {
    zip.start_file(sheet.file_name(), options)?;
    zip.write_all(&sheet.csv)?;
  }
  Ok(zip.finish()?.into_inner())
}
