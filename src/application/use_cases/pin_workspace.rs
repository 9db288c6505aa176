use chrono::Local;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::services::repository_service::RepositoryService;
use crate::application::use_cases::content_sync::ContentSyncEngine;
use crate::common::error::DgitError;
use crate::common::result::DgitResult;
use crate::domain::entities::commit_history::{CommitSummary, PinMetadata};
use crate::infrastructure::pinning::{PinFile, PinRequest, PinningCredentials, PinningService};
use crate::infrastructure::vcs::LogOptions;

/// ピン留めの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinOutcome {
    /// 呼び出し元に返す識別子（可用性コピーのCIDを優先）
    pub identifier: String,

    /// ピン留めサービスが返したハッシュ
    pub remote_hash: Option<String>,

    /// プライマリソースへのエクスポートで得たCID
    pub availability_cid: Option<String>,
}

/// 作業ツリーをピン留めサービスへ送るユースケース
pub struct PinWorkspaceUseCase {
    engine: Arc<ContentSyncEngine>,
    repository: RepositoryService,
    pinning: Arc<dyn PinningService>,
}

impl PinWorkspaceUseCase {
    pub fn new(
        engine: Arc<ContentSyncEngine>,
        repository: RepositoryService,
        pinning: Arc<dyn PinningService>,
    ) -> Self {
        Self {
            engine,
            repository,
            pinning,
        }
    }

    /// 来歴付きでアップロードし、プライマリソースにも可用性コピーを置く
    ///
    /// アップロードとエクスポートの失敗はログに残すのみ。
    /// どちらも識別子を得られなければ`PinFlowFailed`。
    pub async fn execute(&self, credentials: &PinningCredentials) -> DgitResult<PinOutcome> {
        let tree = self.repository.tree();
        let metadata = self.provenance().await;

        let remote_hash = match self.upload(credentials, &metadata).await {
            Ok(hash) => {
                info!("Pinned {} as {}", tree.name, hash);
                Some(hash)
            }
            Err(e) => {
                warn!("Upload to pinning service failed: {}", e);
                None
            }
        };

        let availability_cid = match self.engine.export_primary(&tree.root).await {
            Ok(cid) if !cid.is_empty() => Some(cid),
            Ok(_) => None,
            Err(e) => {
                warn!("Availability export failed: {}", e);
                None
            }
        };

        let identifier = availability_cid
            .clone()
            .or_else(|| remote_hash.clone())
            .ok_or_else(|| {
                DgitError::pin_flow_failed(format!(
                    "neither the pinning service nor {} returned an identifier",
                    self.engine.sources().primary
                ))
            })?;

        Ok(PinOutcome {
            identifier,
            remote_hash,
            availability_cid,
        })
    }

    async fn provenance(&self) -> PinMetadata {
        match self.repository.log(&LogOptions::default()).await {
            Ok(log) => PinMetadata::from_history(log.iter().map(CommitSummary::from).collect()),
            Err(e) => {
                warn!("No commit history: {}", e);
                PinMetadata::no_commits()
            }
        }
    }

    async fn upload(
        &self,
        credentials: &PinningCredentials,
        metadata: &PinMetadata,
    ) -> DgitResult<String> {
        let tree = self.repository.tree();
        let files = self
            .engine
            .collect_tree(&tree.root)
            .await?
            .into_iter()
            .map(|(path, content)| PinFile { path, content })
            .collect();

        let request = PinRequest {
            files,
            name: format!(
                "dgit - {} - {}",
                tree.name,
                Local::now().format("%Y-%m-%d %H:%M:%S")
            ),
            keyvalues: metadata.to_keyvalues()?,
        };

        Ok(self.pinning.pin_file_to_ipfs(credentials, request).await?)
    }

    /// ピン留め済みの一覧
    pub async fn pin_list(&self, credentials: &PinningCredentials) -> DgitResult<Value> {
        Ok(self.pinning.pin_list(credentials).await?)
    }

    /// ハッシュを指定してピン留めを外す
    pub async fn unpin(&self, credentials: &PinningCredentials, hash: &str) -> DgitResult<bool> {
        Ok(self.pinning.unpin(credentials, hash).await?)
    }
}
