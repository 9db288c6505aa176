use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::services::manifest_parser::ManifestParser;
use crate::application::services::repository_service::RepositoryService;
use crate::common::result::DgitResult;
use crate::domain::entities::module_record::{diff_modules, ModuleRecord};
use crate::infrastructure::filesystem::{resolve_in, FileSystem};
use crate::infrastructure::vcs::CheckoutOptions;

/// チェックアウトの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutReport {
    /// チェックアウト後のマニフェストから消えたモジュール
    pub removed: Vec<ModuleRecord>,

    /// 実際に削除したディレクトリ
    pub pruned: Vec<PathBuf>,
}

/// チェックアウトしてサブモジュールを整合させるユースケース
pub struct CheckoutUseCase {
    fs: Arc<dyn FileSystem>,
    repository: RepositoryService,
}

impl CheckoutUseCase {
    pub fn new(fs: Arc<dyn FileSystem>, repository: RepositoryService) -> Self {
        Self { fs, repository }
    }

    /// チェックアウトを実行し、消えたサブモジュールのディレクトリを削除する
    ///
    /// 移動しただけのモジュール（同名でパスが変わったもの）は削除対象にならない。
    pub async fn execute(&self, options: &CheckoutOptions) -> DgitResult<CheckoutReport> {
        let root = self.repository.tree().root.clone();

        // 1. チェックアウト前のモジュール
        let before = ManifestParser::read(self.fs.as_ref(), &root).await;

        // 2. チェックアウト
        self.repository.checkout(options).await?;

        // 3. チェックアウト後のモジュールとの差分
        let after = ManifestParser::read(self.fs.as_ref(), &root).await;
        let removed = diff_modules(&before, &after);

        // 4. 消えたモジュールのディレクトリを削除
        let mut pruned = Vec::new();
        for module in &removed {
            let Some(path) = resolve_in(&root, &module.path) else {
                warn!(
                    "Skipping submodule '{}': path {} escapes the working tree",
                    module.name, module.path
                );
                continue;
            };
            if !self.fs.exists(&path).await || !self.fs.is_dir(&path).await.unwrap_or(false) {
                continue;
            }

            match self.fs.remove_dir_all(&path).await {
                Ok(()) => {
                    info!("Removed submodule '{}' at {}", module.name, path.display());
                    pruned.push(path);
                }
                Err(e) => warn!("Could not remove {}: {}", path.display(), e),
            }
        }

        Ok(CheckoutReport { removed, pruned })
    }
}
