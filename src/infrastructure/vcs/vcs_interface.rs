use async_trait::async_trait;
use std::path::Path;

/// Errors that can occur during version-control operations
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("Repository not found at path: {path}")]
    RepositoryNotFound { path: String },

    #[error("Reference not found: {reference}")]
    ReferenceNotFound { reference: String },

    #[error("Clone operation failed: {message}")]
    CloneFailed { message: String },

    #[error("Checkout failed: {message}")]
    CheckoutFailed { message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Git executable not found: {executable}")]
    ExecutableNotFound { executable: String },

    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    #[error("Invalid URL format: {url}")]
    InvalidUrl { url: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("libgit2 error: {source}")]
    Git2Error {
        #[from]
        source: git2::Error,
    },

    #[error("Command execution failed: {command}, exit code: {exit_code}, stderr: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl VcsError {
    /// Create an unsupported operation error
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a clone failed error
    pub fn clone_failed(message: impl Into<String>) -> Self {
        Self::CloneFailed {
            message: message.into(),
        }
    }

    /// Create a checkout failed error
    pub fn checkout_failed(message: impl Into<String>) -> Self {
        Self::CheckoutFailed {
            message: message.into(),
        }
    }

    /// Create a reference not found error
    pub fn reference_not_found(reference: impl Into<String>) -> Self {
        Self::ReferenceNotFound {
            reference: reference.into(),
        }
    }

    /// Create a network error
    pub fn network_error(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Create an executable not found error
    pub fn executable_not_found(executable: impl Into<String>) -> Self {
        Self::ExecutableNotFound {
            executable: executable.into(),
        }
    }

    /// Create a command failed error
    pub fn command_failed(
        command: impl Into<String>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Token credential for remote operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitAuth {
    pub token: String,
}

impl GitAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// Author or committer identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub email: String,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
}

/// Options for initializing a repository
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Name of the initial branch
    pub default_branch: String,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            default_branch: "main".to_string(),
        }
    }
}

/// Options for checking out a reference
#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
    /// Branch, tag or commit to check out
    pub reference: String,
    /// Discard local changes
    pub force: bool,
    /// Remote to track when the branch only exists remotely
    pub remote: Option<String>,
}

impl CheckoutOptions {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Default::default()
        }
    }
}

/// Options for creating a commit
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    pub message: String,
    /// Overrides the configured identity
    pub author: Option<Person>,
}

/// Options for reading history
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Reference to start walking from
    pub reference: String,
    /// Maximum number of commits
    pub depth: Option<usize>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            reference: "HEAD".to_string(),
            depth: None,
        }
    }
}

/// Options for creating a branch
#[derive(Debug, Clone, Default)]
pub struct BranchOptions {
    pub name: String,
    /// Switch to the branch after creating it
    pub checkout: bool,
}

/// Options for reading a blob
#[derive(Debug, Clone)]
pub struct ReadBlobOptions {
    /// Commit-ish the path is resolved against
    pub reference: String,
    /// Path of the file inside the tree
    pub filepath: String,
}

/// Options for cloning into a directory
#[derive(Debug, Clone, Default)]
pub struct CloneRequest {
    pub url: String,
    /// Shallow clone depth
    pub depth: Option<u32>,
    /// Branch to check out
    pub branch: Option<String>,
    /// Fetch only the checked out branch
    pub single_branch: bool,
    pub auth: Option<GitAuth>,
}

impl CloneRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Options for push, pull and fetch
#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Remote name
    pub remote: String,
    /// Branch to transfer (current branch when None)
    pub reference: Option<String>,
    /// Force push
    pub force: bool,
    pub auth: Option<GitAuth>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            reference: None,
            force: false,
            auth: None,
        }
    }
}

/// One commit of the history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub oid: String,
    pub message: String,
    pub parents: Vec<String>,
    pub tree: String,
    pub author: Person,
    pub committer: Person,
}

/// A configured remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    pub name: String,
    pub url: String,
}

impl RemoteInfo {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Blob content read from the object database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    pub oid: String,
    pub content: Vec<u8>,
}

/// One row of the status matrix
///
/// Columns follow the `[head, workdir, stage]` convention:
/// head is 0 (absent) or 1 (present), workdir is 0 (absent), 1 (same as head)
/// or 2 (different), stage is 0 (absent), 1 (same as head), 2 (same as workdir)
/// or 3 (different from both).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub path: String,
    pub head: u8,
    pub workdir: u8,
    pub stage: u8,
}

/// Common interface for version-control engines
///
/// Every method defaults to [`VcsError::Unsupported`] so that partial
/// engines only implement what they serve.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Initialize a repository (idempotent)
    async fn init(&self, _dir: &Path, _options: &InitOptions) -> Result<(), VcsError> {
        Err(VcsError::unsupported("init"))
    }

    /// Stage a path
    async fn add(&self, _dir: &Path, _filepath: &str) -> Result<(), VcsError> {
        Err(VcsError::unsupported("add"))
    }

    /// Remove a path from the index
    async fn remove(&self, _dir: &Path, _filepath: &str) -> Result<(), VcsError> {
        Err(VcsError::unsupported("remove"))
    }

    /// Check out a reference
    async fn checkout(&self, _dir: &Path, _options: &CheckoutOptions) -> Result<(), VcsError> {
        Err(VcsError::unsupported("checkout"))
    }

    /// Commit the index and return the new oid
    async fn commit(&self, _dir: &Path, _options: &CommitOptions) -> Result<String, VcsError> {
        Err(VcsError::unsupported("commit"))
    }

    /// Read history, newest first
    async fn log(&self, _dir: &Path, _options: &LogOptions) -> Result<Vec<CommitInfo>, VcsError> {
        Err(VcsError::unsupported("log"))
    }

    /// Create a branch
    async fn branch(&self, _dir: &Path, _options: &BranchOptions) -> Result<(), VcsError> {
        Err(VcsError::unsupported("branch"))
    }

    /// List local branches, or the branches of `remote`
    async fn list_branches(
        &self,
        _dir: &Path,
        _remote: Option<&str>,
    ) -> Result<Vec<String>, VcsError> {
        Err(VcsError::unsupported("list_branches"))
    }

    /// Name of the checked out branch (None when detached)
    async fn current_branch(&self, _dir: &Path) -> Result<Option<String>, VcsError> {
        Err(VcsError::unsupported("current_branch"))
    }

    async fn list_remotes(&self, _dir: &Path) -> Result<Vec<RemoteInfo>, VcsError> {
        Err(VcsError::unsupported("list_remotes"))
    }

    async fn add_remote(&self, _dir: &Path, _remote: &RemoteInfo) -> Result<(), VcsError> {
        Err(VcsError::unsupported("add_remote"))
    }

    async fn delete_remote(&self, _dir: &Path, _name: &str) -> Result<(), VcsError> {
        Err(VcsError::unsupported("delete_remote"))
    }

    /// Resolve a reference to an oid
    async fn resolve_ref(&self, _dir: &Path, _reference: &str) -> Result<String, VcsError> {
        Err(VcsError::unsupported("resolve_ref"))
    }

    async fn read_blob(&self, _dir: &Path, _options: &ReadBlobOptions) -> Result<BlobInfo, VcsError> {
        Err(VcsError::unsupported("read_blob"))
    }

    /// List tracked files of a commit (the index when None)
    async fn list_files(
        &self,
        _dir: &Path,
        _reference: Option<&str>,
    ) -> Result<Vec<String>, VcsError> {
        Err(VcsError::unsupported("list_files"))
    }

    /// Status matrix for the given paths (every known path when empty)
    async fn status_matrix(
        &self,
        _dir: &Path,
        _filepaths: &[String],
    ) -> Result<Vec<StatusRow>, VcsError> {
        Err(VcsError::unsupported("status_matrix"))
    }

    /// Clone a repository into `dir`
    async fn clone(&self, _dir: &Path, _request: &CloneRequest) -> Result<(), VcsError> {
        Err(VcsError::unsupported("clone"))
    }

    async fn push(&self, _dir: &Path, _options: &TransferOptions) -> Result<(), VcsError> {
        Err(VcsError::unsupported("push"))
    }

    async fn pull(&self, _dir: &Path, _options: &TransferOptions) -> Result<(), VcsError> {
        Err(VcsError::unsupported("pull"))
    }

    async fn fetch(&self, _dir: &Path, _options: &TransferOptions) -> Result<(), VcsError> {
        Err(VcsError::unsupported("fetch"))
    }
}
