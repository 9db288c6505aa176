use std::path::PathBuf;
use std::sync::Arc;

use crate::application::services::quota_guard::QuotaGuard;
use crate::application::services::repository_service::RepositoryService;
use crate::application::services::settings_service::SettingsService;
use crate::application::use_cases::content_sync::ContentSyncEngine;
use crate::application::use_cases::pin_workspace::PinWorkspaceUseCase;
use crate::common::result::DgitResult;
use crate::domain::entities::dgit_config::DgitConfig;
use crate::domain::entities::working_tree::WorkingTree;
use crate::infrastructure::{
    ConfigStore, FileSystem, GitEngine, IpfsStoreFactory, JsonSettingsStore, KeyValueStore,
    LocalFileSystem, PinataClient, VersionControl,
};

/// Production wiring for one working tree
pub struct AppContext {
    pub tree: WorkingTree,
    pub config: DgitConfig,
    pub config_store: ConfigStore,
    pub fs: Arc<dyn FileSystem>,
    pub vcs: Arc<dyn VersionControl>,
    pub settings: Arc<dyn KeyValueStore>,
}

impl AppContext {
    /// Load `.dgit/config.yml` under `root` and build the adapters
    pub async fn load(root: PathBuf) -> DgitResult<Self> {
        let tree = WorkingTree::from_root(root);
        let config_store = ConfigStore::for_tree(&tree);
        let config = config_store.load().await?;

        let settings_path = match &config.settings_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => tree.root.join(path),
            None => tree.settings_path(),
        };

        Ok(Self {
            tree,
            config,
            config_store,
            fs: Arc::new(LocalFileSystem::new()),
            vcs: Arc::new(GitEngine::new()),
            settings: Arc::new(JsonSettingsStore::new(settings_path)),
        })
    }

    pub fn quota(&self) -> QuotaGuard {
        QuotaGuard::with_threshold(self.settings.clone(), self.config.quota_threshold_kb)
    }

    pub fn repository(&self) -> RepositoryService {
        RepositoryService::new(self.vcs.clone(), self.tree.clone())
    }

    pub fn settings_service(&self) -> SettingsService {
        SettingsService::new(self.settings.clone())
    }

    pub fn sync_engine(&self) -> DgitResult<ContentSyncEngine> {
        let factory = IpfsStoreFactory::new()?;
        Ok(ContentSyncEngine::new(
            self.fs.clone(),
            Arc::new(factory),
            self.config.sources.clone(),
            self.quota(),
        )
        .with_timeout_secs(self.config.import_timeout_secs))
    }

    pub fn pin_workspace(&self) -> DgitResult<PinWorkspaceUseCase> {
        let pinning = PinataClient::new(&self.config.pinning_api_url)?;
        Ok(PinWorkspaceUseCase::new(
            Arc::new(self.sync_engine()?),
            self.repository(),
            Arc::new(pinning),
        ))
    }
}
