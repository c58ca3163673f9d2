//! Error types for locator parsing and registry loading

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocatorError {
    /// Locator string was empty after trimming
    #[error("empty locator expression")]
    Empty,

    /// Locator string could not be interpreted
    #[error("invalid locator '{raw}': {reason}")]
    Invalid { raw: String, reason: String },

    /// Registry document parsed but is inconsistent
    #[error("invalid locator registry: {0}")]
    Registry(String),

    /// Registry document could not be deserialized
    #[error("failed to parse locator document: {0}")]
    Parse(String),

    #[error("failed to read locator file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<serde_yaml::Error> for LocatorError {
    fn from(err: serde_yaml::Error) -> Self {
        LocatorError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for LocatorError {
    fn from(err: serde_json::Error) -> Self {
        LocatorError::Parse(err.to_string())
    }
}
