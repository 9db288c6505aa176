use async_trait::async_trait;
use futures::Stream;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::value_objects::content_source::ContentSource;

/// Errors raised by a content store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Content store unreachable at {endpoint}: {message}")]
    Unreachable { endpoint: String, message: String },

    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Invalid response from content store: {message}")]
    InvalidResponse { message: String },

    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl StoreError {
    pub fn unreachable(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unreachable {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
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

/// Chunks of one file
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, StoreError>> + Send>>;

/// Entries of one retrieval, in arrival order
pub type EntryStream = Pin<Box<dyn Stream<Item = Result<StoreEntry, StoreError>> + Send>>;

/// One retrieved entry
///
/// `path` is prefixed with the requested cid. Directories carry no content.
pub struct StoreEntry {
    pub path: String,
    pub content: Option<ByteStream>,
}

impl StoreEntry {
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: None,
        }
    }

    pub fn file(path: impl Into<String>, content: ByteStream) -> Self {
        Self {
            path: path.into(),
            content: Some(content),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.content.is_none()
    }
}

impl fmt::Debug for StoreEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreEntry")
            .field("path", &self.path)
            .field("is_directory", &self.is_directory())
            .finish()
    }
}

/// One file submitted to an add
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddEntry {
    /// `/`-separated path relative to the tree root
    pub path: String,
    pub content: Vec<u8>,
}

impl AddEntry {
    pub fn new(path: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Address the whole submission as one directory
    pub wrap_with_directory: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Per-request timeout
    pub timeout: Option<Duration>,
}

/// Content-addressed store
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Submit entries and return the resulting cid
    async fn add(&self, entries: Vec<AddEntry>, options: &AddOptions) -> Result<String, StoreError>;

    /// Retrieve the tree addressed by `cid` as a lazy stream
    async fn get(&self, cid: &str, options: &GetOptions) -> Result<EntryStream, StoreError>;

    /// Probe whether the store answers
    async fn check_reachable(&self) -> Result<(), StoreError>;
}

/// Builds a store for a source
pub trait ContentStoreFactory: Send + Sync {
    fn connect(&self, source: &ContentSource) -> Result<Arc<dyn ContentStore>, StoreError>;
}
