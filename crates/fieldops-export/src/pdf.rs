//! PDF renderer.

use fieldops_core::display::{Table, format_datetime};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::{
  ExportOptions, Result,
  layout::{
    BODY_SIZE, EMPTY_NOTICE, FOOTER_SIZE, HEADER_SIZE, MARGIN, PAGE_HEIGHT, PAGE_WIDTH,
    PageFrame, PagePlan, ROW_HEIGHT, TABLE_TOP, TITLE_SIZE, column_widths, document_title, fit,
    frames, paginate, text_width,
  },
};

struct Fonts {
  regular: IndirectFontRef,
  bold:    IndirectFontRef,
}

pub(crate) fn render(tables: &[Table], options: &ExportOptions) -> Result<Vec<u8>> {
  let title = document_title(tables, &options.organization_name);
  let (doc, first_page, first_layer) =
    PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Calque 1");
  let fonts = Fonts {
    regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
    bold:    doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
  };

  let pages = paginate(tables, options.rows_per_page);
  let frames = frames(tables, &pages, &options.organization_name);
  if pages.is_empty() {
    let layer = doc.get_page(first_page).get_layer(first_layer);
    for frame in &frames {
      draw_frame(&layer, &fonts, options, frame);
    }
    draw_notice(&layer, &fonts);
    return Ok(doc.save_to_bytes()?);
  }

  let widths: Vec<Vec<f32>> = tables.iter().map(column_widths).collect();
  for (i, (plan, frame)) in pages.iter().zip(&frames).enumerate() {
    let layer = if i == 0 {
      doc.get_page(first_page).get_layer(first_layer)
    } else {
      let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Calque 1");
      doc.get_page(page).get_layer(layer)
    };
    draw_frame(&layer, &fonts, options, frame);
    draw_rows(&layer, &fonts, &tables[plan.table], &widths[plan.table], plan);
  }

  Ok(doc.save_to_bytes()?)
}

/// Header (organization, title, generation date) and footer (page number,
/// organization).
fn draw_frame(
  layer: &PdfLayerReference,
  fonts: &Fonts,
  options: &ExportOptions,
  frame: &PageFrame,
) {
  let top = PAGE_HEIGHT - MARGIN;
  layer.use_text(&frame.organization, HEADER_SIZE, Mm(MARGIN), Mm(top), &fonts.bold);
  let generated = format!("Généré le {}", format_datetime(options.generated_at));
  let right = PAGE_WIDTH - MARGIN - text_width(&generated, HEADER_SIZE);
  layer.use_text(generated, HEADER_SIZE, Mm(right), Mm(top), &fonts.regular);
  layer.use_text(&frame.title, TITLE_SIZE, Mm(MARGIN), Mm(top - 9.0), &fonts.bold);

  let bottom = MARGIN - 4.0;
  layer.use_text(&frame.footer, FOOTER_SIZE, Mm(MARGIN), Mm(bottom), &fonts.regular);
  let right = PAGE_WIDTH - MARGIN - text_width(&frame.organization, FOOTER_SIZE);
  layer.use_text(&frame.organization, FOOTER_SIZE, Mm(right), Mm(bottom), &fonts.regular);
}

fn draw_rows(
  layer: &PdfLayerReference,
  fonts: &Fonts,
  table: &Table,
  widths: &[f32],
  plan: &PagePlan,
) {
  draw_line(layer, &fonts.bold, HEADER_SIZE, &table.headers, widths, TABLE_TOP);

  let (start, end) = plan.rows;
  if start == end {
    draw_notice(layer, fonts);
    return;
  }
  for (n, row) in table.rows[start..end].iter().enumerate() {
    let y = TABLE_TOP - ROW_HEIGHT * (n as f32 + 1.0);
    draw_line(layer, &fonts.regular, BODY_SIZE, row, widths, y);
  }
}

fn draw_line(
  layer: &PdfLayerReference,
  font: &IndirectFontRef,
  size: f32,
  cells: &[String],
  widths: &[f32],
  y: f32,
) {
  let mut x = MARGIN;
  for (cell, width) in cells.iter().zip(widths) {
    layer.use_text(fit(cell, width - 1.5, size), size, Mm(x), Mm(y), font);
    x += width;
  }
}

fn draw_notice(layer: &PdfLayerReference, fonts: &Fonts) {
  layer.use_text(EMPTY_NOTICE, BODY_SIZE, Mm(MARGIN), Mm(TABLE_TOP - ROW_HEIGHT), &fonts.regular);
}
