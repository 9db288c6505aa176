use std::sync::Arc;
use tracing::warn;

use crate::common::error::DgitError;
use crate::common::result::DgitResult;
use crate::domain::entities::dgit_config::DEFAULT_QUOTA_THRESHOLD_KB;
use crate::infrastructure::filesystem::KeyValueStore;

/// ストレージ使用量のガード
///
/// 破壊的な操作（クローン、サブモジュール解決、インポート）の前に必ず呼ばれる。
/// 使用量はキャッシュせず毎回再計算する。
#[derive(Clone)]
pub struct QuotaGuard {
    store: Arc<dyn KeyValueStore>,
    threshold_kb: f64,
}

impl QuotaGuard {
    /// 既定の上限でガードを作成
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_threshold(store, DEFAULT_QUOTA_THRESHOLD_KB)
    }

    pub fn with_threshold(store: Arc<dyn KeyValueStore>, threshold_kb: f64) -> Self {
        Self {
            store,
            threshold_kb,
        }
    }

    pub fn threshold_kb(&self) -> f64 {
        self.threshold_kb
    }

    /// 現在の使用量（KB、小数点以下2桁に丸める）
    ///
    /// 各エントリは`(キー長 + 値長) * 2`バイトとして数える（長さはUTF-16単位）。
    pub fn usage_kb(&self) -> DgitResult<f64> {
        let bytes: usize = self
            .store
            .entries()?
            .iter()
            .map(|(key, value)| (key.encode_utf16().count() + value.encode_utf16().count()) * 2)
            .sum();

        Ok(round_to_hundredths(bytes as f64 / 1024.0))
    }

    /// 使用量が上限を超えていればStorageExhaustedで失敗する
    pub fn guard_or_fail(&self) -> DgitResult<()> {
        let used_kb = self.usage_kb()?;
        if used_kb > self.threshold_kb {
            warn!(
                "Storage quota exceeded: {:.2} KB used, limit is {:.2} KB",
                used_kb, self.threshold_kb
            );
            return Err(DgitError::storage_exhausted(used_kb, self.threshold_kb));
        }
        Ok(())
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
