//! Core invoice types, the field registry, configuration and errors.
//!
//! The registry in [`FIELD_REGISTRY`] decides which leaves of an [`Invoice`]
//! are shown, in which section, and which of them a user may edit.

mod config;
mod error;
mod registry;
mod types;
mod upload;

pub use config::*;
pub use error::*;
pub use registry::*;
pub use types::*;
pub use upload::*;
