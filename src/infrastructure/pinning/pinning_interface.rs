use async_trait::async_trait;
use serde_json::Value;

/// Errors raised by a pinning service
#[derive(Debug, thiserror::Error)]
pub enum PinningError {
    #[error("Pinning service rejected the credentials: {message}")]
    Unauthorized { message: String },

    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Invalid response from pinning service: {message}")]
    InvalidResponse { message: String },

    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl PinningError {
    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized {
                message: message.into(),
            },
            _ => Self::RequestFailed {
                status,
                message: message.into(),
            },
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }
}

/// API key pair of the pinning service
#[derive(Clone, PartialEq, Eq)]
pub struct PinningCredentials {
    pub api_key: String,
    pub secret_api_key: String,
}

impl PinningCredentials {
    pub fn new(api_key: impl Into<String>, secret_api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
        }
    }
}

impl std::fmt::Debug for PinningCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinningCredentials")
            .field("api_key", &self.api_key)
            .field("secret_api_key", &"***")
            .finish()
    }
}

/// One file of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinFile {
    /// `/`-separated path relative to the tree root
    pub path: String,
    pub content: Vec<u8>,
}

/// A workspace upload with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PinRequest {
    pub files: Vec<PinFile>,
    /// Display name of the pin
    pub name: String,
    /// Provenance key/values
    pub keyvalues: Value,
}

/// Remote persistence service for content
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Upload and pin the files, returning the remote hash
    async fn pin_file_to_ipfs(
        &self,
        credentials: &PinningCredentials,
        request: PinRequest,
    ) -> Result<String, PinningError>;

    /// Pinned items of the account
    async fn pin_list(&self, credentials: &PinningCredentials) -> Result<Value, PinningError>;

    /// Remove a pin; `false` when the service refused
    async fn unpin(&self, credentials: &PinningCredentials, hash: &str)
        -> Result<bool, PinningError>;
}
