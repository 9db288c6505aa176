use std::sync::Arc;
use tracing::info;

use crate::application::services::quota_guard::QuotaGuard;
use crate::common::error::DgitError;
use crate::common::result::DgitResult;
use crate::domain::entities::dgit_config::DEFAULT_CLONE_DEPTH;
use crate::domain::entities::working_tree::WorkingTree;
use crate::domain::value_objects::git_url::GitUrl;
use crate::infrastructure::vcs::{CloneRequest, GitAuth, VersionControl};

/// クローンの設定
#[derive(Debug, Clone)]
pub struct CloneRepositoryConfig {
    /// クローン元のURL
    pub url: String,

    /// 浅いクローンの深さ
    pub depth: u32,

    /// チェックアウトするブランチ（Noneの場合はリモートの既定）
    pub branch: Option<String>,

    /// チェックアウトするブランチのみ取得するか
    pub single_branch: bool,

    /// 認証トークン
    pub auth: Option<GitAuth>,
}

impl CloneRepositoryConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: DEFAULT_CLONE_DEPTH,
            branch: None,
            single_branch: false,
            auth: None,
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_single_branch(mut self, single_branch: bool) -> Self {
        self.single_branch = single_branch;
        self
    }

    pub fn with_auth(mut self, auth: GitAuth) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// 作業ツリーのルートへクローンするユースケース
pub struct CloneRepositoryUseCase {
    vcs: Arc<dyn VersionControl>,
    quota: QuotaGuard,
}

impl CloneRepositoryUseCase {
    pub fn new(vcs: Arc<dyn VersionControl>, quota: QuotaGuard) -> Self {
        Self { vcs, quota }
    }

    pub async fn execute(&self, tree: &WorkingTree, config: &CloneRepositoryConfig) -> DgitResult<()> {
        self.quota.guard_or_fail()?;

        let url = GitUrl::new(&config.url);
        let request = CloneRequest {
            url: url.as_str().to_string(),
            depth: Some(config.depth),
            branch: config.branch.clone(),
            single_branch: config.single_branch,
            auth: config.auth.clone(),
        };

        VersionControl::clone(self.vcs.as_ref(), &tree.root, &request)
            .await
            .map_err(|e| {
                DgitError::git_error_with_source(
                    format!("Failed to clone {}", GitUrl::redact(url.as_str())),
                    e,
                )
            })?;

        info!("Cloned {} into {}", url, tree.root.display());
        Ok(())
    }
}
