use serde::{Deserialize, Serialize};

use super::error::FatturaError;

/// Default upload size limit: 5 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Settings of a [`SessionController`](crate::session::SessionController).
///
/// Deserializes with defaults for every missing key, so hosts can load a
/// partial configuration.
///
/// ```
/// use fattura::core::SessionConfig;
///
/// let config = SessionConfig::default().max_file_size(1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Largest accepted upload, in bytes.
    pub max_file_size: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl SessionConfig {
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn validate(&self) -> Result<(), FatturaError> {
        if self.max_file_size == 0 {
            return Err(FatturaError::Config(
                "max_file_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
