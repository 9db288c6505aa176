use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// マニフェスト（.gitmodules）のサブモジュール定義
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// サブモジュール名（マニフェスト内で一意）
    pub name: String,

    /// リポジトリのURL
    pub url: String,

    /// 作業ツリーのルートからの相対パス
    pub path: String,
}

impl ModuleRecord {
    /// 新しいModuleRecordインスタンスを作成
    pub fn new(name: impl Into<String>, url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            path: path.into(),
        }
    }

    /// パスを持つレコードのみ有効
    pub fn is_valid(&self) -> bool {
        !self.path.is_empty()
    }
}

/// `before`に存在し`after`に存在しないモジュールを名前で求める
///
/// 結果の順序は`before`の順序に従う。
pub fn diff_modules(before: &[ModuleRecord], after: &[ModuleRecord]) -> Vec<ModuleRecord> {
    let remaining: HashSet<&str> = after.iter().map(|m| m.name.as_str()).collect();
    before
        .iter()
        .filter(|m| !remaining.contains(m.name.as_str()))
        .cloned()
        .collect()
}
