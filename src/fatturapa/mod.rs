//! FatturaPA XML mapping.
//!
//! Extracts a fixed subset of the Italian electronic invoice (FatturaPA,
//! versions FPA12/FPR12) into an [`Invoice`]. There is no schema
//! validation: business fields that are missing simply map to empty values,
//! so a user can still inspect and fix the rest of the document.
//!
//! # Example
//!
//! ```
//! use fattura::fatturapa;
//!
//! let invoice = fatturapa::map_invoice(
//!     "<FatturaElettronica><DettaglioLinee><Descrizione>Consulenza</Descrizione></DettaglioLinee></FatturaElettronica>",
//! )
//! .unwrap();
//! assert_eq!(invoice.lines.len(), 1);
//! assert_eq!(invoice.header.number, "");
//!
//! assert!(fatturapa::map_invoice("<FatturaElettronica>").is_err());
//! ```

mod mapping;
mod tree;

pub use mapping::map_document;
pub use tree::{XmlElement, parse_document};

use crate::core::{FatturaError, Invoice};

/// Parse `xml` and map it. Fails only with
/// [`FatturaError::MalformedDocument`].
pub fn map_invoice(xml: &str) -> Result<Invoice, FatturaError> {
    let document = parse_document(xml)?;
    let invoice = map_document(&document);
    tracing::debug!(
        number = %invoice.header.number,
        lines = invoice.lines.len(),
        summary = invoice.summary.len(),
        "mapped FatturaPA document"
    );
    Ok(invoice)
}
