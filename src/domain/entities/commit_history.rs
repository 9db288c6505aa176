use serde::Serialize;
use serde_json::{json, Value};

use crate::common::result::DgitResult;
use crate::infrastructure::vcs::CommitInfo;

/// コミット履歴が無い場合の番兵値
pub const NO_COMMITS: &str = "no commits";

/// ピン留めの来歴に使うコミットの要約
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub oid: String,
    pub message: String,
    pub parent_oids: Vec<String>,
    pub tree_oid: String,
    pub committer_timestamp: i64,
}

impl From<&CommitInfo> for CommitSummary {
    fn from(info: &CommitInfo) -> Self {
        Self {
            oid: info.oid.clone(),
            message: info.message.clone(),
            parent_oids: info.parents.clone(),
            tree_oid: info.tree.clone(),
            committer_timestamp: info.committer.timestamp,
        }
    }
}

#[derive(Serialize)]
struct CompactCommit<'a> {
    oid: &'a str,
    commit: CompactCommitBody<'a>,
}

#[derive(Serialize)]
struct CompactCommitBody<'a> {
    parent: &'a [String],
    tree: &'a str,
    message: &'a str,
    committer: CompactCommitter,
}

#[derive(Serialize)]
struct CompactCommitter {
    timestamp: i64,
}

impl CommitSummary {
    fn compact(&self) -> CompactCommit<'_> {
        CompactCommit {
            oid: &self.oid,
            commit: CompactCommitBody {
                parent: &self.parent_oids,
                tree: &self.tree_oid,
                message: &self.message,
                committer: CompactCommitter {
                    timestamp: self.committer_timestamp,
                },
            },
        }
    }
}

/// ピン留め時に添付する来歴メタデータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinMetadata {
    /// 最新コミットのoid、または`"no commits"`
    pub reference: String,

    /// 最新コミットのメッセージ、または`"no commits"`
    pub message: String,

    /// ログ順のコミット履歴（コミットが無い場合はNone）
    pub history: Option<Vec<CommitSummary>>,
}

impl PinMetadata {
    /// コミットが無い場合のメタデータ
    pub fn no_commits() -> Self {
        Self {
            reference: NO_COMMITS.to_string(),
            message: NO_COMMITS.to_string(),
            history: None,
        }
    }

    /// ログから来歴を構築する（先頭が最新コミット）
    pub fn from_history(history: Vec<CommitSummary>) -> Self {
        let Some(latest) = history.first() else {
            return Self::no_commits();
        };

        Self {
            reference: latest.oid.clone(),
            message: latest.message.clone(),
            history: Some(history),
        }
    }

    /// ピン留めサービスの`keyvalues`フィールドに変換する
    ///
    /// サービス側は文字列値しか受け付けないため、履歴はJSON文字列として埋め込む。
    pub fn to_keyvalues(&self) -> DgitResult<Value> {
        let mut keyvalues = json!({
            "ref": self.reference,
            "message": self.message,
        });

        if let Some(history) = &self.history {
            let compact: Vec<CompactCommit<'_>> = history.iter().map(|c| c.compact()).collect();
            keyvalues["commits"] = Value::String(serde_json::to_string(&compact)?);
        }

        Ok(keyvalues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn summary(oid: &str, parent: Option<&str>) -> CommitSummary {
        CommitSummary {
            oid: oid.to_string(),
            message: format!("commit {}\n", oid),
            parent_oids: parent.map(|p| vec![p.to_string()]).unwrap_or_default(),
            tree_oid: format!("tree-{}", oid),
            committer_timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_no_commits_sentinel() {
        let metadata = PinMetadata::from_history(Vec::new());
        assert_eq!(metadata, PinMetadata::no_commits());

        let keyvalues = metadata.to_keyvalues().unwrap();
        assert_eq!(keyvalues, json!({"ref": "no commits", "message": "no commits"}));
    }

    #[test]
    fn test_latest_commit_becomes_reference() {
        let metadata = PinMetadata::from_history(vec![summary("b2", Some("a1")), summary("a1", None)]);
        assert_eq!(metadata.reference, "b2");
        assert_eq!(metadata.message, "commit b2\n");
        assert_eq!(metadata.history.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_keyvalues_embed_compact_history() {
        let metadata = PinMetadata::from_history(vec![summary("b2", Some("a1"))]);
        let keyvalues = metadata.to_keyvalues().unwrap();

        let commits: Value =
            serde_json::from_str(keyvalues["commits"].as_str().unwrap()).unwrap();
        assert_eq!(
            commits,
            json!([{
                "oid": "b2",
                "commit": {
                    "parent": ["a1"],
                    "tree": "tree-b2",
                    "message": "commit b2\n",
                    "committer": {"timestamp": 1_700_000_000}
                }
            }])
        );
    }
}
