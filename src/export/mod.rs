//! Export projection: from an [`Invoice`](crate::core::Invoice) to the
//! renderer-agnostic [`ExportDocument`].
//!
//! A renderer only ever sees an owned `ExportDocument`, so an export that is
//! still running keeps the data it started with even if the user edits on.

mod format;
mod projection;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::FatturaError;

pub use format::{
    DEFAULT_FILE_NAME, FALLBACK_CURRENCY, compose_address, export_file_name, format_amount,
};
pub use projection::{project, try_project};

/// Heading printed at the top of every exported document.
pub const DOCUMENT_TITLE: &str = "FATTURA ELETTRONICA";

/// Ordered content of an exported invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub title: String,
    /// Suggested file name for the rendered artifact.
    pub file_name: String,
    pub sections: Vec<ExportSection>,
    /// Line items, document order.
    pub lines: ExportTable,
    /// VAT summary, document order. Rendered after the line items.
    pub summary: ExportTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSection {
    pub title: String,
    pub entries: Vec<ExportEntry>,
}

/// A `label: value` row; empty values are left for the renderer to fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(feature = "json")]
impl ExportDocument {
    /// Pretty-printed JSON, for renderers living outside Rust.
    pub fn to_json(&self) -> Result<String, FatturaError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FatturaError::Render(format!("JSON serialization failed: {e}")))
    }
}

/// Plain-text preview.
impl fmt::Display for ExportDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}", section.title)?;
            for entry in &section.entries {
                let value = if entry.value.is_empty() {
                    "N/A"
                } else {
                    &entry.value
                };
                writeln!(f, "  {}: {}", entry.label, value)?;
            }
        }
        for table in [&self.lines, &self.summary] {
            if table.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{}", table.title)?;
            writeln!(f, "  {}", table.headers.join(" | "))?;
            for row in &table.rows {
                writeln!(f, "  {}", row.join(" | "))?;
            }
        }
        Ok(())
    }
}

/// Turns an [`ExportDocument`] into file bytes (PDF or otherwise).
pub trait InvoiceRenderer {
    fn render(&self, document: &ExportDocument) -> Result<Vec<u8>, FatturaError>;
}

/// A rendered export, ready to be offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Render a projected document, keeping its suggested file name.
pub fn render_invoice(
    renderer: &dyn InvoiceRenderer,
    document: ExportDocument,
) -> Result<ExportArtifact, FatturaError> {
    let bytes = renderer.render(&document)?;
    Ok(ExportArtifact {
        file_name: document.file_name,
        bytes,
    })
}
