use std::path::Path;
use std::sync::Arc;

use crate::common::error::DgitError;
use crate::common::result::{DgitResult, DgitResultExt};
use crate::domain::entities::working_tree::WorkingTree;
use crate::infrastructure::vcs::{
    BlobInfo, BranchOptions, CheckoutOptions, CommitInfo, CommitOptions, InitOptions, LogOptions,
    ReadBlobOptions, RemoteInfo, StatusRow, TransferOptions, VersionControl,
};

/// ブランチ一覧の1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    /// ブランチ名
    pub name: String,

    /// リモートブランチの場合はリモート名
    pub remote: Option<String>,
}

/// バージョン管理のファサード
///
/// 全ての呼び出しを作業ツリーのルートに束縛してエンジンへ委譲する。
#[derive(Clone)]
pub struct RepositoryService {
    vcs: Arc<dyn VersionControl>,
    tree: WorkingTree,
}

impl RepositoryService {
    pub fn new(vcs: Arc<dyn VersionControl>, tree: WorkingTree) -> Self {
        Self { vcs, tree }
    }

    pub fn tree(&self) -> &WorkingTree {
        &self.tree
    }

    fn dir(&self) -> &Path {
        &self.tree.root
    }

    /// リポジトリを初期化する（冪等、既定ブランチはmain）
    pub async fn init(&self) -> DgitResult<()> {
        Ok(self.vcs.init(self.dir(), &InitOptions::default()).await?)
    }

    pub async fn add(&self, filepath: &str) -> DgitResult<()> {
        Ok(self.vcs.add(self.dir(), filepath).await?)
    }

    pub async fn remove(&self, filepath: &str) -> DgitResult<()> {
        Ok(self.vcs.remove(self.dir(), filepath).await?)
    }

    pub async fn checkout(&self, options: &CheckoutOptions) -> DgitResult<()> {
        self.vcs
            .checkout(self.dir(), options)
            .await
            .map_err(|e| {
                DgitError::git_error_with_source(
                    format!("Checkout of '{}' failed", options.reference),
                    e,
                )
            })
    }

    /// 初期化してからコミットする
    pub async fn commit(&self, options: &CommitOptions) -> DgitResult<String> {
        self.init().await?;
        Ok(self.vcs.commit(self.dir(), options).await?)
    }

    pub async fn status_matrix(&self, filepaths: &[String]) -> DgitResult<Vec<StatusRow>> {
        Ok(self.vcs.status_matrix(self.dir(), filepaths).await?)
    }

    pub async fn log(&self, options: &LogOptions) -> DgitResult<Vec<CommitInfo>> {
        Ok(self.vcs.log(self.dir(), options).await?)
    }

    pub async fn list_files(&self, reference: Option<&str>) -> DgitResult<Vec<String>> {
        Ok(self.vcs.list_files(self.dir(), reference).await?)
    }

    pub async fn resolve_ref(&self, reference: &str) -> DgitResult<String> {
        Ok(self.vcs.resolve_ref(self.dir(), reference).await?)
    }

    pub async fn read_blob(&self, options: &ReadBlobOptions) -> DgitResult<BlobInfo> {
        Ok(self.vcs.read_blob(self.dir(), options).await?)
    }

    pub async fn branch(&self, options: &BranchOptions) -> DgitResult<()> {
        Ok(self.vcs.branch(self.dir(), options).await?)
    }

    pub async fn add_remote(&self, remote: &RemoteInfo) -> DgitResult<()> {
        Ok(self.vcs.add_remote(self.dir(), remote).await?)
    }

    pub async fn delete_remote(&self, name: &str) -> DgitResult<()> {
        Ok(self.vcs.delete_remote(self.dir(), name).await?)
    }

    pub async fn push(&self, options: &TransferOptions) -> DgitResult<()> {
        Ok(self.vcs.push(self.dir(), options).await?)
    }

    pub async fn pull(&self, options: &TransferOptions) -> DgitResult<()> {
        Ok(self.vcs.pull(self.dir(), options).await?)
    }

    pub async fn fetch(&self, options: &TransferOptions) -> DgitResult<()> {
        Ok(self.vcs.fetch(self.dir(), options).await?)
    }

    /// リモート一覧（エラー時は空）
    pub async fn remotes(&self) -> Vec<RemoteInfo> {
        self.vcs
            .list_remotes(self.dir())
            .await
            .map_err(DgitError::from)
            .unwrap_or_default_logged()
    }

    /// 現在のブランチ名（エラー時やdetached HEADでは空文字列）
    pub async fn current_branch(&self) -> String {
        self.vcs
            .current_branch(self.dir())
            .await
            .map_err(DgitError::from)
            .to_option_logged()
            .flatten()
            .unwrap_or_default()
    }

    /// ローカルブランチに続けて各リモートのブランチを返す（エラー時は空）
    pub async fn branches(&self) -> Vec<BranchInfo> {
        self.collect_branches().await.unwrap_or_default_logged()
    }

    async fn collect_branches(&self) -> DgitResult<Vec<BranchInfo>> {
        let mut branches: Vec<BranchInfo> = self
            .vcs
            .list_branches(self.dir(), None)
            .await?
            .into_iter()
            .map(|name| BranchInfo { name, remote: None })
            .collect();

        for remote in self.vcs.list_remotes(self.dir()).await? {
            let names = self
                .vcs
                .list_branches(self.dir(), Some(&remote.name))
                .await?;
            branches.extend(names.into_iter().map(|name| BranchInfo {
                name,
                remote: Some(remote.name.clone()),
            }));
        }

        Ok(branches)
    }
}
