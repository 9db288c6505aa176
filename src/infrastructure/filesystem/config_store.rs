use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tracing::debug;
use validator::Validate;

use crate::common::result::{DgitResult, ResultExt};
use crate::domain::entities::dgit_config::DgitConfig;
use crate::domain::entities::working_tree::WorkingTree;

/// Loads and saves `.dgit/config.yml`
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for the configuration file of a working tree
    pub fn for_tree(tree: &WorkingTree) -> Self {
        Self::new(tree.config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the configuration
    ///
    /// Returns the defaults when the file does not exist.
    pub async fn load(&self) -> DgitResult<DgitConfig> {
        if !async_fs::try_exists(&self.path).await.unwrap_or(false) {
            debug!("No config at {}, using defaults", self.path.display());
            return Ok(DgitConfig::default());
        }

        let content = async_fs::read_to_string(&self.path)
            .await
            .with_filesystem_error("Failed to read config file", Some(self.path.clone()))?;

        let config: DgitConfig = if content.trim().is_empty() {
            DgitConfig::default()
        } else {
            serde_yaml::from_str(&content)?
        };
        config.validate()?;

        Ok(config)
    }

    /// Validate and write the configuration
    pub async fn save(&self, config: &DgitConfig) -> DgitResult<()> {
        config.validate()?;

        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await.with_filesystem_error(
                "Failed to create config directory",
                Some(parent.to_path_buf()),
            )?;
        }

        let content = serde_yaml::to_string(config)?;
        async_fs::write(&self.path, content)
            .await
            .with_filesystem_error("Failed to write config file", Some(self.path.clone()))
    }
}
