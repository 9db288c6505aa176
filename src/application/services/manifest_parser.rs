use std::path::Path;
use tracing::debug;

use crate::domain::entities::module_record::ModuleRecord;
use crate::infrastructure::filesystem::FileSystem;

/// マニフェストのファイル名
pub const MANIFEST_FILE_NAME: &str = ".gitmodules";

/// .gitmodulesのパーサー
///
/// 行単位の寛容なパーサーで、不完全なレコード（pathなし）は黙って捨てる。
pub struct ManifestParser;

impl ManifestParser {
    /// マニフェストのテキストをレコードに変換する（マニフェストの順序を保持）
    ///
    /// ```
    /// use dgit::application::services::manifest_parser::ManifestParser;
    ///
    /// let text = "[submodule \"lib\"]\n\tpath = libs/lib\n\turl = https://github.com/org/lib.git\n";
    /// let modules = ManifestParser::parse(text);
    /// assert_eq!(modules.len(), 1);
    /// assert_eq!(modules[0].name, "lib");
    /// assert_eq!(modules[0].path, "libs/lib");
    /// ```
    pub fn parse(text: &str) -> Vec<ModuleRecord> {
        let mut modules = Vec::new();
        let mut current = ModuleRecord::default();

        for line in text.lines().map(str::trim) {
            if line.starts_with('[') {
                let finished = std::mem::take(&mut current);
                if finished.is_valid() {
                    modules.push(finished);
                }
                current.name = quoted_name(line);
            } else if line.starts_with("url") {
                if let Some(value) = value_after_equals(line) {
                    current.url = value;
                }
            } else if line.starts_with("path") {
                if let Some(value) = value_after_equals(line) {
                    current.path = value;
                }
            }
        }

        if current.is_valid() {
            modules.push(current);
        }

        modules
    }

    /// ディレクトリの.gitmodulesを読み込む
    ///
    /// ファイルが無い、または読めない場合は空リストを返す。
    pub async fn read(fs: &dyn FileSystem, dir: &Path) -> Vec<ModuleRecord> {
        let manifest_path = dir.join(MANIFEST_FILE_NAME);

        match fs.read_file(&manifest_path).await {
            Ok(bytes) => Self::parse(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                debug!("No manifest at {}: {}", manifest_path.display(), e);
                Vec::new()
            }
        }
    }
}

/// 最初の`"`の組に囲まれたテキスト
fn quoted_name(line: &str) -> String {
    line.split('"').nth(1).unwrap_or_default().to_string()
}

/// 最初の`=`以降のテキスト（トリム済み）
fn value_after_equals(line: &str) -> Option<String> {
    line.split_once('=').map(|(_, value)| value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_preserves_order() {
        let text = r#"
[submodule "b"]
	path = libs/b
	url = https://github.com/org/b.git
[submodule "a"]
	path = libs/a
	url = git@github.com:org/a.git
"#;
        let modules = ManifestParser::parse(text);
        assert_eq!(
            modules,
            vec![
                ModuleRecord::new("b", "https://github.com/org/b.git", "libs/b"),
                ModuleRecord::new("a", "git@github.com:org/a.git", "libs/a"),
            ]
        );
    }

    #[test]
    fn test_records_without_path_are_dropped() {
        let text = r#"
[submodule "nopath"]
	url = https://github.com/org/nopath.git
[submodule "ok"]
	path = ok
"#;
        let modules = ManifestParser::parse(text);
        assert_eq!(modules, vec![ModuleRecord::new("ok", "", "ok")]);
    }

    #[test]
    fn test_value_keeps_text_after_first_equals() {
        let text = "[submodule \"q\"]\npath = dir\nurl = https://host/x?a=b\n";
        assert_eq!(ManifestParser::parse(text)[0].url, "https://host/x?a=b");
    }

    #[test]
    fn test_header_without_quotes_has_empty_name() {
        let modules = ManifestParser::parse("[submodule]\npath = x\n");
        assert_eq!(modules[0].name, "");
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(ManifestParser::parse("").is_empty());
        assert!(ManifestParser::parse("\n\n").is_empty());
    }

    #[test]
    fn test_path_before_any_header_is_kept() {
        let modules = ManifestParser::parse("path = orphan\n");
        assert_eq!(modules, vec![ModuleRecord::new("", "", "orphan")]);
    }
}
