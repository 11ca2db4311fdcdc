use serde::{Deserialize, Serialize};

use super::config::SessionConfig;
use super::error::FatturaError;

/// Kind of an uploaded file, as told by its name or MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Xml,
    Pdf,
    Unknown,
}

impl FileKind {
    /// Extension first, then MIME type.
    ///
    /// ```
    /// use fattura::core::FileKind;
    ///
    /// assert_eq!(FileKind::detect("IT01234567890_FPR01.XML", None), FileKind::Xml);
    /// assert_eq!(FileKind::detect("upload", Some("text/xml")), FileKind::Xml);
    /// assert_eq!(FileKind::detect("scan.png", Some("image/png")), FileKind::Unknown);
    /// ```
    pub fn detect(file_name: &str, mime_type: Option<&str>) -> Self {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".xml") {
            return FileKind::Xml;
        }
        if lower.ends_with(".pdf") {
            return FileKind::Pdf;
        }
        match mime_type {
            Some("application/xml" | "text/xml") => FileKind::Xml,
            Some("application/pdf") => FileKind::Pdf,
            _ => FileKind::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Xml => "xml",
            FileKind::Pdf => "pdf",
            FileKind::Unknown => "unknown",
        }
    }
}

/// What the upload collaborator knows about a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: String,
    /// Size in bytes as reported by the source.
    pub size: u64,
    pub mime_type: Option<String>,
}

/// A file whose content has been read by the upload collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedFile {
    pub descriptor: FileDescriptor,
    pub kind: FileKind,
    pub content: String,
}

impl LoadedFile {
    /// Build from a descriptor, detecting the kind.
    pub fn new(descriptor: FileDescriptor, content: impl Into<String>) -> Self {
        let kind = FileKind::detect(&descriptor.name, descriptor.mime_type.as_deref());
        Self {
            descriptor,
            kind,
            content: content.into(),
        }
    }

    /// An XML file with the given name; the size is the content length.
    pub fn xml(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            descriptor: FileDescriptor {
                name: name.into(),
                size: content.len() as u64,
                mime_type: Some("application/xml".into()),
            },
            kind: FileKind::Xml,
            content,
        }
    }

    /// Reject files the mapper must not see.
    pub fn check(&self, config: &SessionConfig) -> Result<(), FatturaError> {
        if self.kind != FileKind::Xml {
            return Err(FatturaError::UnsupportedFileKind(format!(
                "{} ({}), only XML invoices can be loaded",
                self.descriptor.name,
                self.kind.as_str()
            )));
        }
        let size = self.descriptor.size.max(self.content.len() as u64);
        if size > config.max_file_size {
            return Err(FatturaError::FileTooLarge {
                size,
                max: config.max_file_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, mime: Option<&str>) -> FileDescriptor {
        FileDescriptor {
            name: name.into(),
            size: 10,
            mime_type: mime.map(Into::into),
        }
    }

    #[test]
    fn extension_wins_over_mime() {
        assert_eq!(FileKind::detect("a.pdf", Some("text/xml")), FileKind::Pdf);
        assert_eq!(FileKind::detect("a.Xml", Some("application/pdf")), FileKind::Xml);
    }

    #[test]
    fn mime_fallback() {
        assert_eq!(FileKind::detect("blob", Some("application/xml")), FileKind::Xml);
        assert_eq!(FileKind::detect("blob", Some("application/pdf")), FileKind::Pdf);
        assert_eq!(FileKind::detect("blob", None), FileKind::Unknown);
    }

    #[test]
    fn check_rejects_non_xml() {
        let file = LoadedFile::new(descriptor("fattura.pdf", None), "%PDF-1.4");
        assert!(matches!(
            file.check(&SessionConfig::default()),
            Err(FatturaError::UnsupportedFileKind(_))
        ));

        let file = LoadedFile::new(descriptor("fattura.p7m", None), "");
        assert!(matches!(
            file.check(&SessionConfig::default()),
            Err(FatturaError::UnsupportedFileKind(_))
        ));
    }

    #[test]
    fn check_enforces_size_limit() {
        let file = LoadedFile::xml("big.xml", "x".repeat(64));
        assert_eq!(
            file.check(&SessionConfig::default().max_file_size(32)),
            Err(FatturaError::FileTooLarge { size: 64, max: 32 })
        );
        assert!(file.check(&SessionConfig::default()).is_ok());
    }
}
