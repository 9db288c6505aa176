use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::application::services::manifest_parser::ManifestParser;
use crate::application::services::quota_guard::QuotaGuard;
use crate::common::result::DgitResult;
use crate::domain::entities::module_record::ModuleRecord;
use crate::domain::entities::working_tree::join_relative;
use crate::domain::value_objects::git_url::GitUrl;
use crate::infrastructure::filesystem::{resolve_in, FileSystem};
use crate::infrastructure::vcs::{CloneRequest, GitAuth, VersionControl};

/// サブモジュールのクローン深さ
const SUBMODULE_CLONE_DEPTH: u32 = 1;

/// モジュール単位の失敗の種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleFailureKind {
    /// クローンに失敗した
    CloneFailed(String),

    /// 祖先に同じURLがある、または同じURLとパスを既に解決済み
    CycleDetected,

    /// パスが作業ツリーの外を指している（`..`や絶対パス）
    InvalidPath,
}

impl fmt::Display for ModuleFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleFailureKind::CloneFailed(message) => write!(f, "clone failed: {}", message),
            ModuleFailureKind::CycleDetected => write!(f, "cycle detected"),
            ModuleFailureKind::InvalidPath => write!(f, "path escapes the working tree"),
        }
    }
}

/// 失敗したモジュール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFailure {
    pub module: ModuleRecord,
    /// 作業ツリーのルートからの相対パス
    pub directory: String,
    pub kind: ModuleFailureKind,
}

/// クローンできたモジュール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub module: ModuleRecord,
    /// 作業ツリーのルートからの相対パス
    pub directory: String,
}

/// ディレクトリごとのマニフェスト件数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSummary {
    /// 作業ツリーのルートからの相対パス（ルートは空文字列）
    pub directory: String,
    pub module_count: usize,
}

/// サブモジュール解決の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// 読み込んだマニフェスト（解決順）
    pub manifests: Vec<ManifestSummary>,

    /// クローンできたモジュール（解決順）
    pub resolved: Vec<ResolvedModule>,

    /// 失敗したモジュール（解決順）
    pub failures: Vec<ModuleFailure>,
}

impl ResolveReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// ルートのマニフェストを含む全マニフェストのモジュール数
    pub fn total_modules(&self) -> usize {
        self.manifests.iter().map(|m| m.module_count).sum()
    }
}

/// クローン先が確定したモジュール
struct PendingModule {
    module: ModuleRecord,
    target: PathBuf,
}

/// 解決中のディレクトリ
struct Frame {
    dir: String,
    /// このディレクトリに至るまでにクローンしたURL
    ancestors: Vec<String>,
    pending: VecDeque<PendingModule>,
}

/// サブモジュールを再帰的に解決するユースケース
///
/// 明示的なスタックで深さ優先に、マニフェストの順序どおり逐次処理する。
pub struct ResolveSubmodulesUseCase {
    fs: Arc<dyn FileSystem>,
    vcs: Arc<dyn VersionControl>,
    quota: QuotaGuard,
}

impl ResolveSubmodulesUseCase {
    pub fn new(fs: Arc<dyn FileSystem>, vcs: Arc<dyn VersionControl>, quota: QuotaGuard) -> Self {
        Self { fs, vcs, quota }
    }

    /// `root`以下の全サブモジュールを解決する
    ///
    /// モジュール単位の失敗は結果に記録して続行する。
    pub async fn execute(&self, root: &Path, auth: Option<&GitAuth>) -> DgitResult<ResolveReport> {
        // ファイルシステムに触れる前に確認する
        self.quota.guard_or_fail()?;

        let mut report = ResolveReport::default();
        let mut visited: HashSet<(String, String)> = HashSet::new();
        let root_frame = self
            .open_frame(String::new(), root, Vec::new(), &mut report)
            .await;
        let mut stack = vec![root_frame];

        loop {
            let next = match stack.last_mut() {
                Some(frame) => frame
                    .pending
                    .pop_front()
                    .map(|pending| (pending, frame.dir.clone(), frame.ancestors.clone())),
                None => break,
            };

            let Some((PendingModule { module, target }, parent_dir, ancestors)) = next else {
                stack.pop();
                continue;
            };

            let url = GitUrl::normalize(&module.url);
            let directory = join_relative(&parent_dir, &module.path);

            if ancestors.contains(&url) || !visited.insert((url.clone(), directory.clone())) {
                warn!(
                    "Skipping submodule '{}' at {}: {} is already being resolved",
                    module.name, directory, url
                );
                report.failures.push(ModuleFailure {
                    module,
                    directory,
                    kind: ModuleFailureKind::CycleDetected,
                });
                continue;
            }

            let request = CloneRequest {
                url: url.clone(),
                depth: Some(SUBMODULE_CLONE_DEPTH),
                branch: None,
                single_branch: true,
                auth: auth.cloned(),
            };
            match VersionControl::clone(self.vcs.as_ref(), &target, &request).await {
                Ok(()) => {
                    info!("Cloned submodule '{}' into {}", module.name, directory);
                    report.resolved.push(ResolvedModule {
                        module,
                        directory: directory.clone(),
                    });

                    let mut lineage = ancestors;
                    lineage.push(url);
                    let frame = self
                        .open_frame(directory, &target, lineage, &mut report)
                        .await;
                    stack.push(frame);
                }
                Err(e) => {
                    error!("Failed to clone submodule '{}': {}", module.name, e);
                    report.failures.push(ModuleFailure {
                        module,
                        directory,
                        kind: ModuleFailureKind::CloneFailed(e.to_string()),
                    });
                }
            }
        }

        Ok(report)
    }

    /// マニフェストを読み、古いモジュールディレクトリを削除してフレームを作る
    ///
    /// `dir_path`は`dir`に対応する実パス。ツリーの外を指すモジュールは
    /// 削除もクローンもせず、失敗として記録する。
    async fn open_frame(
        &self,
        dir: String,
        dir_path: &Path,
        ancestors: Vec<String>,
        report: &mut ResolveReport,
    ) -> Frame {
        let modules = ManifestParser::read(self.fs.as_ref(), dir_path).await;
        info!("Found {} submodules in /{}", modules.len(), dir);
        report.manifests.push(ManifestSummary {
            directory: dir.clone(),
            module_count: modules.len(),
        });

        let mut pending = VecDeque::with_capacity(modules.len());
        for module in modules {
            let Some(target) = resolve_in(dir_path, &module.path) else {
                let directory = join_relative(&dir, &module.path);
                warn!(
                    "Skipping submodule '{}': path {} escapes the working tree",
                    module.name, module.path
                );
                report.failures.push(ModuleFailure {
                    module,
                    directory,
                    kind: ModuleFailureKind::InvalidPath,
                });
                continue;
            };

            if self.fs.exists(&target).await && self.fs.is_dir(&target).await.unwrap_or(false) {
                if let Err(e) = self.fs.remove_dir_all(&target).await {
                    warn!("Could not remove stale {}: {}", target.display(), e);
                }
            }
            pending.push_back(PendingModule { module, target });
        }

        Frame {
            dir,
            ancestors,
            pending,
        }
    }
}
