use std::path::PathBuf;
use thiserror::Error;

use crate::infrastructure::content_store::StoreError;
use crate::infrastructure::pinning::PinningError;
use crate::infrastructure::vcs::VcsError;

#[derive(Error, Debug)]
pub enum DgitError {
    #[error("Git operation failed: {message}")]
    GitError {
        message: String,
        #[source]
        source: Option<VcsError>,
    },

    #[error("File system operation failed: {message}")]
    FileSystemError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Content store error: {message}")]
    ContentStoreError {
        message: String,
        #[source]
        source: Option<StoreError>,
    },

    #[error("Pinning service error: {message}")]
    PinningServiceError {
        message: String,
        #[source]
        source: Option<PinningError>,
    },

    #[error("Local storage is full: {used_kb:.2} KB used, limit is {threshold_kb:.2} KB")]
    StorageExhausted { used_kb: f64, threshold_kb: f64 },

    #[error("cannot retrieve {cid}")]
    ContentNotFound { cid: String },

    #[error("Pin flow failed: {message}")]
    PinFlowFailed { message: String },

    #[error("Validation error: {field} - {message}")]
    ValidationError {
        field: String,
        message: String,
        value: Option<String>,
    },

    #[error("Serialization error: {message}")]
    SerializationError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Operation timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DgitError {
    pub fn git_error(message: impl Into<String>) -> Self {
        Self::GitError {
            message: message.into(),
            source: None,
        }
    }

    pub fn git_error_with_source(message: impl Into<String>, source: VcsError) -> Self {
        Self::GitError {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn filesystem_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn content_store_error(message: impl Into<String>, source: StoreError) -> Self {
        Self::ContentStoreError {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn pinning_error(message: impl Into<String>, source: PinningError) -> Self {
        Self::PinningServiceError {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn storage_exhausted(used_kb: f64, threshold_kb: f64) -> Self {
        Self::StorageExhausted {
            used_kb,
            threshold_kb,
        }
    }

    pub fn content_not_found(cid: impl Into<String>) -> Self {
        Self::ContentNotFound { cid: cid.into() }
    }

    pub fn pin_flow_failed(message: impl Into<String>) -> Self {
        Self::PinFlowFailed {
            message: message.into(),
        }
    }

    pub fn validation_error(
        field: impl Into<String>,
        message: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
            value,
        }
    }

    pub fn serialization_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn timeout(timeout_secs: u64) -> Self {
        Self::Timeout { timeout_secs }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InternalError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the error came from a content store rather than the local tree.
    pub fn is_content_store_error(&self) -> bool {
        matches!(self, Self::ContentStoreError { .. } | Self::Timeout { .. })
    }
}

impl From<VcsError> for DgitError {
    fn from(error: VcsError) -> Self {
        Self::git_error_with_source("Git operation failed", error)
    }
}

impl From<StoreError> for DgitError {
    fn from(error: StoreError) -> Self {
        Self::content_store_error("Content store request failed", error)
    }
}

impl From<PinningError> for DgitError {
    fn from(error: PinningError) -> Self {
        Self::pinning_error("Pinning service request failed", error)
    }
}

impl From<std::io::Error> for DgitError {
    fn from(error: std::io::Error) -> Self {
        Self::filesystem_error_with_source("File system operation failed", None, error)
    }
}

impl From<serde_yaml::Error> for DgitError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialization_error_with_source("YAML serialization failed", error)
    }
}

impl From<serde_json::Error> for DgitError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization_error_with_source("JSON serialization failed", error)
    }
}

impl From<validator::ValidationErrors> for DgitError {
    fn from(error: validator::ValidationErrors) -> Self {
        Self::config_error_with_source("Configuration validation failed", error)
    }
}
