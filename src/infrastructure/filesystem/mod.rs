pub mod config_store;
pub mod file_system;
pub mod settings_store;

pub use config_store::ConfigStore;
pub use file_system::{create_directories, resolve_in, walk_files, DirEntry, FileSystem, LocalFileSystem};
pub use settings_store::{JsonSettingsStore, KeyValueStore};
