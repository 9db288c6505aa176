/// Infrastructure layer modules
///
/// This layer provides concrete implementations for external system interactions:
/// - Version control (libgit2 reads, git executable for mutations and transport)
/// - Content-addressed stores (Kubo HTTP RPC)
/// - Pinning service (Pinata)
/// - File system, settings and configuration storage
pub mod content_store;
pub mod filesystem;
pub mod pinning;
pub mod vcs;

// Re-export commonly used types
pub use content_store::{ContentStore, ContentStoreFactory, IpfsStoreFactory, StoreError};
pub use filesystem::{ConfigStore, FileSystem, JsonSettingsStore, KeyValueStore, LocalFileSystem};
pub use pinning::{PinataClient, PinningCredentials, PinningError, PinningService};
pub use vcs::{GitEngine, VcsError, VersionControl};
