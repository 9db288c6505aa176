use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::application::services::quota_guard::QuotaGuard;
use crate::common::error::DgitError;
use crate::common::result::{async_helpers, DgitResult};
use crate::domain::entities::dgit_config::DEFAULT_IMPORT_TIMEOUT_SECS;
use crate::domain::entities::working_tree::CONFIG_DIR_NAME;
use crate::domain::value_objects::content_source::{ContentSource, ContentSources, SourceSlot};
use crate::infrastructure::content_store::{
    AddEntry, AddOptions, ContentStoreFactory, GetOptions, StoreError,
};
use crate::infrastructure::filesystem::{create_directories, resolve_in, walk_files, FileSystem};

/// インポートに成功したソース
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub slot: SourceSlot,
    pub source: ContentSource,
}

fn is_local_config(relative: &str) -> bool {
    relative.split('/').next() == Some(CONFIG_DIR_NAME)
}

/// 作業ツリーとコンテンツアドレス型ストアの同期エンジン
pub struct ContentSyncEngine {
    fs: Arc<dyn FileSystem>,
    factory: Arc<dyn ContentStoreFactory>,
    sources: ContentSources,
    quota: QuotaGuard,
    timeout_secs: u64,
}

impl ContentSyncEngine {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        factory: Arc<dyn ContentStoreFactory>,
        sources: ContentSources,
        quota: QuotaGuard,
    ) -> Self {
        Self {
            fs,
            factory,
            sources,
            quota,
            timeout_secs: DEFAULT_IMPORT_TIMEOUT_SECS,
        }
    }

    /// 取得のタイムアウト（秒）を設定
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn sources(&self) -> &ContentSources {
        &self.sources
    }

    /// ツリー内の全ファイルを(相対パス, 内容)として収集する
    ///
    /// 各階層でディレクトリをファイルより先に辿る。
    /// ルート直下の`.dgit`（ローカル設定）は含めない。
    pub async fn collect_tree(&self, root: &Path) -> DgitResult<Vec<(String, Vec<u8>)>> {
        let paths = walk_files(self.fs.as_ref(), root).await.map_err(|e| {
            DgitError::filesystem_error_with_source(
                "Failed to enumerate working tree",
                Some(root.to_path_buf()),
                e,
            )
        })?;

        let mut files = Vec::with_capacity(paths.len());
        for relative in paths.into_iter().filter(|p| !is_local_config(p)) {
            let path = resolve_in(root, &relative).ok_or_else(|| {
                DgitError::filesystem_error(
                    format!("Path escapes the working tree: {}", relative),
                    Some(root.to_path_buf()),
                )
            })?;
            let content = self.fs.read_file(&path).await.map_err(|e| {
                DgitError::filesystem_error_with_source("Failed to read file", Some(path), e)
            })?;
            files.push((relative, content));
        }
        Ok(files)
    }

    /// ツリー全体を1つのディレクトリとして追加し、そのCIDを返す
    pub async fn export_tree(&self, root: &Path, source: &ContentSource) -> DgitResult<String> {
        let entries: Vec<AddEntry> = self
            .collect_tree(root)
            .await?
            .into_iter()
            .map(|(path, content)| AddEntry::new(path, content))
            .collect();
        let count = entries.len();

        let store = self.factory.connect(source)?;
        let cid = store
            .add(
                entries,
                &AddOptions {
                    wrap_with_directory: true,
                },
            )
            .await?;

        info!("Exported {} files to {} as {}", count, source, cid);
        Ok(cid)
    }

    /// プライマリソースへエクスポートする
    pub async fn export_primary(&self, root: &Path) -> DgitResult<String> {
        self.export_tree(root, &self.sources.primary).await
    }

    /// 1つのソースからインポートする
    ///
    /// ストア側の失敗とタイムアウトは「見つからない」（false）として扱う。
    /// ローカルへの書き込み失敗はエラーとして返す。
    pub async fn import_from(
        &self,
        cid: &str,
        source: &ContentSource,
        root: &Path,
    ) -> DgitResult<bool> {
        match async_helpers::with_timeout(self.fetch_into(cid, source, root), self.timeout_secs)
            .await
        {
            Ok(found) => Ok(found),
            Err(e) if e.is_content_store_error() => {
                warn!("Could not retrieve {} from {}: {}", cid, source, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_into(&self, cid: &str, source: &ContentSource, root: &Path) -> DgitResult<bool> {
        let store = self.factory.connect(source)?;
        let options = GetOptions {
            timeout: Some(Duration::from_secs(self.timeout_secs)),
        };
        let mut entries = store.get(cid, &options).await?;

        let mut found = false;
        while let Some(entry) = entries.next().await {
            let entry = entry?;
            if !entry.path.is_empty() {
                found = true;
            }

            let stripped = entry.path.replacen(cid, "", 1);
            let relative = stripped.trim_start_matches('/');
            let target = resolve_in(root, relative).ok_or_else(|| {
                StoreError::invalid_response(format!(
                    "entry {} escapes the target directory",
                    entry.path
                ))
            })?;

            match entry.content {
                None => create_directories(self.fs.as_ref(), &target).await,
                Some(mut content) => {
                    let mut buffer = Vec::new();
                    while let Some(chunk) = content.next().await {
                        buffer.extend_from_slice(&chunk?);
                    }

                    if let Some(parent) = target.parent() {
                        create_directories(self.fs.as_ref(), parent).await;
                    }
                    self.fs.write_file(&target, &buffer).await.map_err(|e| {
                        DgitError::filesystem_error_with_source(
                            "Failed to write imported file",
                            Some(target.clone()),
                            e,
                        )
                    })?;
                    debug!("Imported {} ({} bytes)", relative, buffer.len());
                }
            }
        }

        Ok(found)
    }

    /// ソースを優先順に試してインポートする
    ///
    /// `local_only`の場合はユーザーソースのみを試す。
    pub async fn import_all(
        &self,
        cid: &str,
        local_only: bool,
        root: &Path,
    ) -> DgitResult<ImportOutcome> {
        self.quota.guard_or_fail()?;

        let candidates: Vec<(SourceSlot, &ContentSource)> = if local_only {
            vec![(SourceSlot::User, &self.sources.user)]
        } else {
            self.sources.priority_order().to_vec()
        };

        for (slot, source) in candidates {
            info!("Retrieving {} from {} source {}", cid, slot, source);
            if self.import_from(cid, source, root).await? {
                return Ok(ImportOutcome {
                    slot,
                    source: source.clone(),
                });
            }
        }

        Err(DgitError::content_not_found(cid))
    }

    /// ユーザーソースを差し替え、到達可能かを返す
    pub async fn set_user_source(&mut self, source: ContentSource) -> bool {
        self.sources.user = source;
        let user = self.sources.user.clone();
        self.check_source(&user).await
    }

    /// ソースが到達可能か
    pub async fn check_source(&self, source: &ContentSource) -> bool {
        let store = match self.factory.connect(source) {
            Ok(store) => store,
            Err(e) => {
                warn!("Could not connect to {}: {}", source, e);
                return false;
            }
        };

        match store.check_reachable().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Source {} is not reachable: {}", source, e);
                false
            }
        }
    }
}
