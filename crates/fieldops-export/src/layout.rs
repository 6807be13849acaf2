//! Page geometry and pagination, independent of the PDF backend.

use fieldops_core::display::Table;

use crate::{Error, Result};

pub const DEFAULT_ROWS_PER_PAGE: usize = 25;

/// Printed in place of rows when a table is empty.
pub const EMPTY_NOTICE: &str = "Aucune donnée";

// A4 landscape, millimetres.
pub const PAGE_WIDTH: f32 = 297.0;
pub const PAGE_HEIGHT: f32 = 210.0;
pub const MARGIN: f32 = 12.0;

pub const TITLE_SIZE: f32 = 14.0;
pub const HEADER_SIZE: f32 = 9.0;
pub const BODY_SIZE: f32 = 8.0;
pub const FOOTER_SIZE: f32 = 8.0;

/// Baseline of the first table row and the step between rows.
pub const TABLE_TOP: f32 = PAGE_HEIGHT - MARGIN - 22.0;
pub const ROW_HEIGHT: f32 = 6.0;

const PT_TO_MM: f32 = 0.3528;
// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_RATIO: f32 = 0.52;

pub fn check_shape(table: &Table) -> Result<()> {
  let expected = table.headers.len();
  match table.rows.iter().position(|r| r.len() != expected) {
    Some(row) => Err(Error::RaggedRow {
      row,
      expected,
      found: table.rows[row].len(),
    }),
    None => Ok(()),
  }
}

/// One physical page: a slice of one table's rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
  pub table:  usize,
  /// First and one-past-last row of the slice; equal for an empty table.
  pub rows:   (usize, usize),
  /// 1-based, across the whole document.
  pub number: usize,
  pub total:  usize,
}

/// Split every table into pages of at most `rows_per_page` rows. An empty
/// table still gets one page; an empty document gets none.
pub fn paginate(tables: &[Table], rows_per_page: usize) -> Vec<PagePlan> {
  let per_page = rows_per_page.max(1);
  let mut pages = Vec::new();
  for (t, table) in tables.iter().enumerate() {
    if table.is_empty() {
      pages.push((t, (0, 0)));
      continue;
    }
    let n = table.rows.len();
    let mut start = 0;
    while start < n {
      let end = (start + per_page).min(n);
      pages.push((t, (start, end)));
      start = end;
    }
  }

  let total = pages.len();
  pages
    .into_iter()
    .enumerate()
    .map(|(i, (table, rows))| PagePlan { table, rows, number: i + 1, total })
    .collect()
}

/// Approximate printed width of `text` in millimetres.
pub fn text_width(text: &str, size: f32) -> f32 {
  text.chars().count() as f32 * size * GLYPH_RATIO * PT_TO_MM
}

/// Column widths proportional to the longest cell of each column, filling
/// the printable width.
pub fn column_widths(table: &Table) -> Vec<f32> {
  let weights: Vec<f32> = table
    .headers
    .iter()
    .enumerate()
    .map(|(c, header)| {
      let longest = table
        .rows
        .iter()
        .filter_map(|r| r.get(c))
        .chain(std::iter::once(header))
        .map(|cell| cell.chars().count())
        .max()
        .unwrap_or(1);
      longest.clamp(4, 40) as f32
    })
    .collect();

  let sum: f32 = weights.iter().sum();
  let printable = PAGE_WIDTH - 2.0 * MARGIN;
  weights.iter().map(|w| printable * w / sum.max(1.0)).collect()
}

/// Cut `text` so it fits `width` at `size`, marking the cut with "…".
pub fn fit(text: &str, width: f32, size: f32) -> String {
  if text_width(text, size) <= width {
    return text.to_string();
  }
  let per_char = size * GLYPH_RATIO * PT_TO_MM;
  let keep = ((width / per_char) as usize).saturating_sub(1);
  let mut out: String = text.chars().take(keep).collect();
  out.push('…');
  out
}

pub fn footer_text(number: usize, total: usize) -> String { format!("Page {number} / {total}") }

/// Text printed around one page's rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFrame {
  pub organization: String,
  pub title:        String,
  /// `Page n / N`.
  pub footer:       String,
}

pub fn document_title(tables: &[Table], organization: &str) -> String {
  match tables {
    [only] => only.title.clone(),
    _ => format!("Export {organization}"),
  }
}

/// One frame per planned page. A document with no pages still gets one
/// frame, titled after the document.
pub fn frames(tables: &[Table], pages: &[PagePlan], organization: &str) -> Vec<PageFrame> {
  if pages.is_empty() {
    return vec![PageFrame {
      organization: organization.to_string(),
      title:        document_title(tables, organization),
      footer:       footer_text(1, 1),
    }];
  }
  pages
    .iter()
    .map(|plan| PageFrame {
      organization: organization.to_string(),
      title:        tables[plan.table].title.clone(),
      footer:       footer_text(plan.number, plan.total),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn table(rows: usize) -> Table {
    Table {
      title:   "T".into(),
      sheet:   "T".into(),
      headers: vec!["A".into(), "B".into()],
      rows:    (0..rows).map(|i| vec![i.to_string(), "x".into()]).collect(),
    }
  }

  #[test]
  fn rows_split_across_pages() {
    let pages = paginate(&[table(7)], 3);
    let slices: Vec<_> = pages.iter().map(|p| p.rows).collect();
    assert_eq!(slices, vec![(0, 3), (3, 6), (6, 7)]);
    assert!(pages.iter().all(|p| p.total == 3));
    assert_eq!(pages.last().unwrap().number, 3);
  }

  #[test]
  fn numbering_spans_tables() {
    let pages = paginate(&[table(2), table(0), table(5)], 4);
    assert_eq!(pages.len(), 4);
    assert_eq!(pages[1], PagePlan { table: 1, rows: (0, 0), number: 2, total: 4 });
    assert_eq!(pages[3].table, 2);
  }

  #[test]
  fn nothing_to_paginate() {
    assert!(paginate(&[], 10).is_empty());
    assert_eq!(paginate(&[table(1)], 0).len(), 1);
  }

  #[test]
  fn widths_fill_the_page() {
    let widths = column_widths(&table(3));
    let sum: f32 = widths.iter().sum();
    assert!((sum - (PAGE_WIDTH - 2.0 * MARGIN)).abs() < 0.01);
  }

  #[test]
  fn long_cells_are_cut() {
    assert_eq!(fit("court", 100.0, BODY_SIZE), "court");
    let cut = fit(&"a".repeat(200), 20.0, BODY_SIZE);
    assert!(cut.ends_with('…'));
    assert!(text_width(&cut, BODY_SIZE) <= 20.0 + 2.0);
  }

  #[test]
  fn footer() {
    assert_eq!(footer_text(2, 5), "Page 2 / 5");
  }

  #[test]
  fn every_page_carries_its_number_and_the_organization() {
    let mut second = table(4);
    second.title = "Techniciens".into();
    let tables = [table(5), second];
    let pages = paginate(&tables, 2);
    let frames = frames(&tables, &pages, "FieldOps Algérie");

    let footers: Vec<&str> = frames.iter().map(|f| f.footer.as_str()).collect();
    assert_eq!(footers, [
      "Page 1 / 5",
      "Page 2 / 5",
      "Page 3 / 5",
      "Page 4 / 5",
      "Page 5 / 5"
    ]);
    assert!(frames.iter().all(|f| f.organization == "FieldOps Algérie"));
    let titles: Vec<&str> = frames.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, ["T", "T", "T", "Techniciens", "Techniciens"]);
  }

  #[test]
  fn empty_document_still_has_a_frame() {
    let frames = frames(&[], &[], "FieldOps");
    assert_eq!(frames, vec![PageFrame {
      organization: "FieldOps".into(),
      title:        "Export FieldOps".into(),
      footer:       "Page 1 / 1".into(),
    }]);
  }
}
