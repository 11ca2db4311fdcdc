use thiserror::Error;

/// Errors that can occur while loading, editing or exporting an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FatturaError {
    /// The input text is not well-formed XML.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The uploaded file is not an XML document.
    #[error("unsupported file kind: {0}")]
    UnsupportedFileKind(String),

    /// The uploaded file exceeds the configured size limit.
    #[error("file too large: {size} bytes (maximum {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    /// The upload collaborator reported a failure while reading the file.
    #[error("upload failed: {0}")]
    Upload(String),

    /// Export was requested while no invoice is loaded.
    #[error("no invoice data to export")]
    NoDataToExport,

    /// The field exists but is read-only.
    #[error("field is not editable: {0}")]
    FieldNotEditable(String),

    /// The path does not name any field of the registry.
    #[error("unknown field path: {0}")]
    UnknownField(String),

    /// The static field registry is inconsistent with the invoice model.
    #[error("field registry error: {0}")]
    Registry(String),

    /// The renderer failed to produce the exported artifact.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FatturaError {
    /// Whether this failure should reach the user.
    ///
    /// Rejected edits are internal: the view never offers those fields, so a
    /// rejection only means a stale or hostile caller.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            FatturaError::FieldNotEditable(_) | FatturaError::UnknownField(_)
        )
    }
}
