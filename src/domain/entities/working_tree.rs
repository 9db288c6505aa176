use std::path::{Path, PathBuf};

/// 設定ディレクトリ名
pub const CONFIG_DIR_NAME: &str = ".dgit";

/// 作業ツリーのエンティティ
///
/// サブモジュール解決と同期エンジンはこのルートからの相対パスで動作する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingTree {
    /// ルートディレクトリ
    pub root: PathBuf,

    /// ワークスペース名
    pub name: String,
}

impl WorkingTree {
    /// 新しいWorkingTreeインスタンスを作成
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
        }
    }

    /// ルートのディレクトリ名をワークスペース名として作成
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workspace".to_string());
        Self { root, name }
    }

    /// ルートからの相対パスを絶対パスに変換
    pub fn path_of(&self, relative: &str) -> PathBuf {
        let normalized = normalize_relative(relative);
        if normalized.is_empty() {
            self.root.clone()
        } else {
            self.root.join(normalized)
        }
    }

    /// 絶対パスをルートからの相対パス（`/`区切り）に変換
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        let stripped = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = stripped
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }

    /// 設定ディレクトリのパス
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(CONFIG_DIR_NAME)
    }

    /// config.ymlのパス
    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join("config.yml")
    }

    /// 設定値ストア（settings.json）の既定パス
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir().join("settings.json")
    }
}

/// 相対パスを正規化する（`\`を`/`に統一し、空要素と`.`を除去）
pub fn normalize_relative(path: &str) -> String {
    path.split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// 2つの相対パスを連結して正規化する
pub fn join_relative(base: &str, child: &str) -> String {
    normalize_relative(&format!("{}/{}", base, child))
}
