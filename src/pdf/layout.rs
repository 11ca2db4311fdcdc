use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

use crate::export::{ExportDocument, ExportTable};

use super::{FOOTER_SPACE_MM, PT_PER_MM, PdfLayout};
use super::encoding::win_ansi;

/// Average Helvetica glyph width relative to the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;
const NARROW_COLUMN_MM: f32 = 25.0;

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

fn real(v: f32) -> Object {
    Object::Real(v)
}

fn text_width_mm(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH / PT_PER_MM
}

/// Cut `text` so it fits `width_mm` at `size` points.
fn fit(text: &str, width_mm: f32, size: f32) -> String {
    let max_chars = (width_mm / (size * AVG_GLYPH_WIDTH / PT_PER_MM)).floor() as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Collects drawing operations page by page. Positions are millimetres
/// from the top-left corner; conversion to PDF space happens on emit.
pub(super) struct PageWriter<'a> {
    layout: &'a PdfLayout,
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl<'a> PageWriter<'a> {
    pub(super) fn new(layout: &'a PdfLayout) -> Self {
        Self {
            layout,
            pages: Vec::new(),
            ops: Vec::new(),
            y: layout.margin_mm,
        }
    }

    fn content_width(&self) -> f32 {
        self.layout.page_width_mm - 2.0 * self.layout.margin_mm
    }

    /// Lowest baseline usable above the footer.
    fn bottom_limit(&self) -> f32 {
        self.layout.page_height_mm - self.layout.margin_mm - FOOTER_SPACE_MM
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.ops));
        self.y = self.layout.margin_mm;
    }

    fn ensure_space(&mut self, needed: f32) -> bool {
        if self.y + needed > self.bottom_limit() {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn pdf_y(&self, y_mm: f32) -> f32 {
        (self.layout.page_height_mm - y_mm) * PT_PER_MM
    }

    fn text(&mut self, x_mm: f32, y_mm: f32, size: f32, font: Font, text: &str) {
        let y = self.pdf_y(y_mm);
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.resource().into(), real(size)]),
            Operation::new("Td", vec![real(x_mm * PT_PER_MM), real(y)]),
            Operation::new("Tj", vec![Object::String(win_ansi(text), StringFormat::Literal)]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn rule(&mut self, x1_mm: f32, x2_mm: f32, y_mm: f32, width_pt: f32) {
        let y = self.pdf_y(y_mm);
        self.ops.extend([
            Operation::new("w", vec![real(width_pt)]),
            Operation::new("m", vec![real(x1_mm * PT_PER_MM), real(y)]),
            Operation::new("l", vec![real(x2_mm * PT_PER_MM), real(y)]),
            Operation::new("S", vec![]),
        ]);
    }

    fn fill_rect(&mut self, x_mm: f32, y_top_mm: f32, w_mm: f32, h_mm: f32, rgb: [u8; 3]) {
        let [r, g, b] = rgb.map(|c| c as f32 / 255.0);
        let y = self.pdf_y(y_top_mm + h_mm);
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", vec![real(r), real(g), real(b)]),
            Operation::new(
                "re",
                vec![
                    real(x_mm * PT_PER_MM),
                    real(y),
                    real(w_mm * PT_PER_MM),
                    real(h_mm * PT_PER_MM),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn title(&mut self, title: &str) {
        let margin = self.layout.margin_mm;
        let width = self.content_width();
        self.fill_rect(margin - 5.0, self.y - 5.0, width + 10.0, 15.0, [240, 240, 255]);
        self.text(margin, self.y + 2.0, 16.0, Font::Bold, title);
        self.y += self.layout.line_height_mm + 5.0;
    }

    fn section_heading(&mut self, title: &str) {
        let lh = self.layout.line_height_mm;
        self.y += 5.0;
        self.ensure_space(3.0 * lh);
        let margin = self.layout.margin_mm;
        self.text(margin, self.y, 14.0, Font::Bold, title);
        self.y += lh;
        self.rule(margin, margin + self.content_width(), self.y - 2.0, 0.5);
        self.y += 3.0;
    }

    fn entry(&mut self, label: &str, value: &str) {
        self.ensure_space(self.layout.line_height_mm);
        let margin = self.layout.margin_mm;
        let value_x = margin + self.layout.value_offset_mm;
        let value = if value.is_empty() {
            self.layout.placeholder.as_str()
        } else {
            value
        };
        let value = fit(value, margin + self.content_width() - value_x, 10.0);
        self.text(margin, self.y, 10.0, Font::Bold, label);
        self.text(value_x, self.y, 10.0, Font::Regular, &value);
        self.y += self.layout.line_height_mm;
    }

    /// First column takes the remaining width, the others are narrow.
    fn column_widths(&self, columns: usize) -> Vec<f32> {
        let narrow = NARROW_COLUMN_MM * columns.saturating_sub(1) as f32;
        let mut widths = vec![NARROW_COLUMN_MM; columns];
        if let Some(first) = widths.first_mut() {
            *first = (self.content_width() - narrow).max(NARROW_COLUMN_MM);
        }
        widths
    }

    fn table_row(&mut self, cells: &[String], widths: &[f32], font: Font) {
        let lh = self.layout.line_height_mm;
        let mut x = self.layout.margin_mm;
        for (cell, width) in cells.iter().zip(widths) {
            let cell = fit(cell, width - 3.0, 9.0);
            self.text(x + 2.0, self.y + 5.0, 9.0, font, &cell);
            x += width;
        }
        self.y += lh;
        let margin = self.layout.margin_mm;
        self.rule(margin, margin + self.content_width(), self.y, 0.2);
    }

    fn table_header(&mut self, table: &ExportTable, widths: &[f32]) {
        let margin = self.layout.margin_mm;
        let width = self.content_width();
        self.fill_rect(margin, self.y, width, self.layout.line_height_mm, [240, 240, 240]);
        self.table_row(&table.headers, widths, Font::Bold);
    }

    fn table(&mut self, table: &ExportTable) {
        if table.is_empty() {
            return;
        }
        self.section_heading(&table.title);
        let lh = self.layout.line_height_mm;
        let widths = self.column_widths(table.headers.len());
        self.ensure_space(3.0 * lh);
        self.table_header(table, &widths);

        for (i, row) in table.rows.iter().enumerate() {
            if self.ensure_space(lh) {
                self.table_header(table, &widths);
            }
            if i % 2 == 0 {
                let margin = self.layout.margin_mm;
                let width = self.content_width();
                self.fill_rect(margin, self.y, width, lh, [248, 248, 248]);
            }
            self.table_row(row, &widths, Font::Regular);
        }
    }

    pub(super) fn document(&mut self, document: &ExportDocument) {
        self.title(&document.title);
        for section in &document.sections {
            self.section_heading(&section.title);
            for entry in &section.entries {
                self.entry(&entry.label, &entry.value);
            }
        }
        self.table(&document.lines);
        self.table(&document.summary);
    }

    /// Close the last page and stamp `text - Pagina i di n` on every page.
    pub(super) fn finish(mut self) -> Vec<Vec<Operation>> {
        self.pages.push(std::mem::take(&mut self.ops));
        let total = self.pages.len();
        let layout = self.layout;
        let margin = layout.margin_mm;
        let page_h = layout.page_height_mm;
        let pages = std::mem::take(&mut self.pages);

        pages
            .into_iter()
            .enumerate()
            .map(|(i, ops)| {
                self.ops = ops;
                self.rule(margin, layout.page_width_mm - margin, page_h - 20.0, 0.5);
                let footer = format!("{} - Pagina {} di {}", layout.footer_text, i + 1, total);
                let x = (layout.page_width_mm - text_width_mm(&footer, 8.0)) / 2.0;
                self.ops.push(Operation::new("q", vec![]));
                self.ops.push(Operation::new("rg", vec![real(0.4), real(0.4), real(0.4)]));
                self.text(x, page_h - 10.0, 8.0, Font::Regular, &footer);
                self.ops.push(Operation::new("Q", vec![]));
                std::mem::take(&mut self.ops)
            })
            .collect()
    }
}
