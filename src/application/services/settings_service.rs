use std::sync::Arc;
use tracing::error;

use crate::common::result::DgitResultExt;
use crate::infrastructure::filesystem::KeyValueStore;

/// 設定値の読み書き
#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 値を取得する（未設定やエラー時はNone）
    pub fn get_item(&self, key: &str) -> Option<String> {
        self.store.get(key).to_option_logged().flatten()
    }

    /// 値を保存する（失敗時はログを出してfalse）
    pub fn set_item(&self, key: &str, value: &str) -> bool {
        match self.store.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to store setting '{}': {}", key, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::filesystem::JsonSettingsStore;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get_item() {
        let temp_dir = TempDir::new().unwrap();
        let service = SettingsService::new(Arc::new(JsonSettingsStore::new(
            temp_dir.path().join("settings.json"),
        )));

        assert_eq!(service.get_item("gateway"), None);
        assert!(service.set_item("gateway", "http://127.0.0.1:5001"));
        assert_eq!(
            service.get_item("gateway"),
            Some("http://127.0.0.1:5001".to_string())
        );
    }

    #[test]
    fn test_set_item_reports_failure() {
        let temp_dir = TempDir::new().unwrap();
        // a directory where the file should be
        let path = temp_dir.path().join("settings.json");
        std::fs::create_dir_all(&path).unwrap();

        let service = SettingsService::new(Arc::new(JsonSettingsStore::new(&path)));
        assert!(!service.set_item("key", "value"));
        assert_eq!(service.get_item("key"), None);
    }
}
