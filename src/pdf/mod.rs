//! A4 PDF rendering of an [`ExportDocument`] with `lopdf`.
//!
//! Uses the standard Helvetica fonts, so no font files are embedded. Line
//! items break across pages with the table header repeated, and every page
//! carries a `Pagina i di n` footer.
//!
//! ```no_run
//! use fattura::pdf::PdfRenderer;
//! use fattura::session::SessionController;
//! use fattura::{LoadedFile, SessionConfig};
//!
//! let xml = std::fs::read_to_string("fattura.xml")?;
//! let mut controller = SessionController::new(SessionConfig::default(), PdfRenderer::default())?;
//! controller.on_file_loaded(LoadedFile::xml("fattura.xml", xml));
//! let artifact = controller.export()?;
//! std::fs::write(&artifact.file_name, &artifact.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod encoding;
mod layout;

use lopdf::content::Content;
use lopdf::{Document, Object, Stream, dictionary};
use serde::{Deserialize, Serialize};

use crate::core::FatturaError;
use crate::export::{ExportDocument, InvoiceRenderer};

use layout::PageWriter;

const PT_PER_MM: f32 = 72.0 / 25.4;
/// Reserved above the bottom margin for the page footer.
const FOOTER_SPACE_MM: f32 = 10.0;
/// A page must hold a section heading or a table header with one row.
const MIN_LINES_PER_PAGE: f32 = 3.0;

/// Page geometry and fixed texts. Lengths are millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PdfLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub line_height_mm: f32,
    /// Distance of the value column from the left margin.
    pub value_offset_mm: f32,
    /// Printed in place of empty values.
    pub placeholder: String,
    pub footer_text: String,
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 20.0,
            line_height_mm: 7.0,
            value_offset_mm: 50.0,
            placeholder: "N/A".to_string(),
            footer_text: "Documento generato automaticamente".to_string(),
        }
    }
}

impl PdfLayout {
    /// Reject geometry the page writer cannot lay out.
    pub fn validate(&self) -> Result<(), FatturaError> {
        let lengths = [
            ("pageWidthMm", self.page_width_mm),
            ("pageHeightMm", self.page_height_mm),
            ("marginMm", self.margin_mm),
            ("lineHeightMm", self.line_height_mm),
            ("valueOffsetMm", self.value_offset_mm),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(FatturaError::Config(format!(
                    "{name} must be a non-negative length, got {value}"
                )));
            }
        }
        if self.line_height_mm <= 0.0 {
            return Err(FatturaError::Config("lineHeightMm must be positive".into()));
        }
        let usable_height = self.page_height_mm - 2.0 * self.margin_mm - FOOTER_SPACE_MM;
        if usable_height < MIN_LINES_PER_PAGE * self.line_height_mm {
            return Err(FatturaError::Config(format!(
                "margins leave {usable_height:.1} mm of page height, need {:.1} mm",
                MIN_LINES_PER_PAGE * self.line_height_mm
            )));
        }
        let content_width = self.page_width_mm - 2.0 * self.margin_mm;
        if content_width <= self.value_offset_mm {
            return Err(FatturaError::Config(format!(
                "margins leave {content_width:.1} mm of page width, less than the value offset"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    layout: PdfLayout,
}

impl PdfRenderer {
    /// Fails with [`FatturaError::Config`] when the layout is unusable.
    pub fn new(layout: PdfLayout) -> Result<Self, FatturaError> {
        layout.validate()?;
        Ok(Self { layout })
    }

    pub fn layout(&self) -> &PdfLayout {
        &self.layout
    }

    fn build(&self, document: &ExportDocument) -> Result<Document, FatturaError> {
        let mut writer = PageWriter::new(&self.layout);
        writer.document(document);
        let pages = writer.finish();

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => Object::Reference(regular_id),
                "F2" => Object::Reference(bold_id),
            },
        });

        let media_box = vec![
            0.into(),
            0.into(),
            Object::Real(self.layout.page_width_mm * PT_PER_MM),
            Object::Real(self.layout.page_height_mm * PT_PER_MM),
        ];
        let mut kids = Vec::with_capacity(pages.len());
        for operations in pages {
            let content = Content { operations }
                .encode()
                .map_err(|e| FatturaError::Render(format!("failed to encode page: {e}")))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => media_box.clone(),
                "Contents" => Object::Reference(content_id),
                "Resources" => Object::Reference(resources_id),
            });
            kids.push(Object::Reference(page_id));
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        let creation_date = chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(document.file_name.trim_end_matches(".pdf")),
            "Producer" => Object::string_literal(concat!("fattura ", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(creation_date),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.trailer.set("Info", Object::Reference(info_id));
        Ok(doc)
    }
}

impl InvoiceRenderer for PdfRenderer {
    fn render(&self, document: &ExportDocument) -> Result<Vec<u8>, FatturaError> {
        let mut doc = self.build(document)?;
        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| FatturaError::Render(format!("failed to save PDF: {e}")))?;
        tracing::debug!(
            pages = doc.get_pages().len(),
            bytes = output.len(),
            "rendered invoice PDF"
        );
        Ok(output)
    }
}
