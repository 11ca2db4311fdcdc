//! # fattura
//!
//! Core of a FatturaPA (Italian electronic invoice) viewer: map the XML into an
//! [`Invoice`](core::Invoice), edit a fixed set of fields in a session that can
//! always be reset to what was loaded, and project the result into a
//! renderer-agnostic [`ExportDocument`](export::ExportDocument) for PDF output.
//!
//! All business values stay strings exactly as they appear in the document;
//! a missing node is an empty string, never an error.
//!
//! ## Quick Start
//!
//! ```rust
//! use fattura::core::*;
//! use fattura::export::{ExportDocument, InvoiceRenderer};
//! use fattura::session::{SessionController, SessionState};
//!
//! struct Preview;
//!
//! impl InvoiceRenderer for Preview {
//!     fn render(&self, document: &ExportDocument) -> Result<Vec<u8>, FatturaError> {
//!         Ok(document.to_string().into_bytes())
//!     }
//! }
//!
//! let xml = r#"<FatturaElettronica>
//!   <FatturaElettronicaBody>
//!     <DatiGenerali><DatiGeneraliDocumento>
//!       <Divisa>EUR</Divisa><Numero>42/A</Numero>
//!     </DatiGeneraliDocumento></DatiGenerali>
//!   </FatturaElettronicaBody>
//! </FatturaElettronica>"#;
//!
//! let mut controller = SessionController::new(SessionConfig::default(), Preview).unwrap();
//! controller.on_file_loaded(LoadedFile::xml("fattura.xml", xml));
//! assert_eq!(controller.state(), SessionState::Loaded);
//!
//! controller.edit_field("customer.city", "Roma");
//! let artifact = controller.export().unwrap();
//! assert_eq!(artifact.file_name, "Invoice_42_A.pdf");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice model, field registry, FatturaPA mapper, edit session, export projection |
//! | `pdf` | `lopdf` based [`InvoiceRenderer`](export::InvoiceRenderer) |
//! | `json` | JSON serialization of export documents |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod fatturapa;

#[cfg(feature = "core")]
pub mod session;

#[cfg(feature = "core")]
pub mod export;

#[cfg(feature = "pdf")]
pub mod pdf;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
