use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::domain::value_objects::content_source::ContentSources;

/// ピン留めサービスの既定API
pub const DEFAULT_PINNING_API_URL: &str = "https://api.pinata.cloud";

/// ストレージ使用量の既定上限（KB）
pub const DEFAULT_QUOTA_THRESHOLD_KB: f64 = 10000.0;

/// インポートの既定タイムアウト（秒）
pub const DEFAULT_IMPORT_TIMEOUT_SECS: u64 = 60;

/// クローンの既定の深さ
pub const DEFAULT_CLONE_DEPTH: u32 = 10;

fn default_pinning_api_url() -> String {
    DEFAULT_PINNING_API_URL.to_string()
}

fn default_quota_threshold_kb() -> f64 {
    DEFAULT_QUOTA_THRESHOLD_KB
}

fn default_import_timeout_secs() -> u64 {
    DEFAULT_IMPORT_TIMEOUT_SECS
}

fn default_clone_depth() -> u32 {
    DEFAULT_CLONE_DEPTH
}

/// .dgit/config.yml設定ファイルの構造
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DgitConfig {
    /// コンテンツストアの接続先
    #[serde(default)]
    #[validate(nested)]
    pub sources: ContentSources,

    /// ピン留めサービスのベースURL
    #[serde(default = "default_pinning_api_url")]
    #[validate(url)]
    pub pinning_api_url: String,

    /// ストレージ使用量の上限（KB）
    #[serde(default = "default_quota_threshold_kb")]
    #[validate(range(min = 0.0))]
    pub quota_threshold_kb: f64,

    /// インポートのタイムアウト（秒）
    #[serde(default = "default_import_timeout_secs")]
    #[validate(range(min = 1))]
    pub import_timeout_secs: u64,

    /// 設定値ストアのファイル（未指定時は.dgit/settings.json）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_file: Option<PathBuf>,

    /// クローンの深さ
    #[serde(default = "default_clone_depth")]
    #[validate(range(min = 1))]
    pub clone_depth: u32,
}

impl Default for DgitConfig {
    fn default() -> Self {
        Self {
            sources: ContentSources::default(),
            pinning_api_url: default_pinning_api_url(),
            quota_threshold_kb: DEFAULT_QUOTA_THRESHOLD_KB,
            import_timeout_secs: DEFAULT_IMPORT_TIMEOUT_SECS,
            settings_file: None,
            clone_depth: DEFAULT_CLONE_DEPTH,
        }
    }
}
