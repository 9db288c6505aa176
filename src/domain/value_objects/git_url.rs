use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

/// GitHubのSSH形式プレフィックス
pub const GITHUB_SSH_PREFIX: &str = "git@github.com:";

/// GitHubのHTTPS形式プレフィックス
pub const GITHUB_HTTPS_PREFIX: &str = "https://github.com/";

/// GitURL関連のエラー
#[derive(Debug, Error, PartialEq)]
pub enum GitUrlError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported URL scheme for token authentication: {0}")]
    UnsupportedScheme(String),
}

/// Git URLの値オブジェクト
///
/// 生成時に`git@github.com:`形式のURLをHTTPS形式へ正規化する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitUrl {
    /// 正規化されたURL文字列
    url: String,
}

impl GitUrl {
    /// 新しいGitUrlインスタンスを作成
    pub fn new(url: &str) -> Self {
        Self {
            url: Self::normalize(url),
        }
    }

    /// SSH形式のGitHub URLをHTTPS形式に変換する
    ///
    /// ```
    /// use dgit::domain::value_objects::git_url::GitUrl;
    ///
    /// assert_eq!(
    ///     GitUrl::normalize("git@github.com:org/repo.git"),
    ///     "https://github.com/org/repo.git"
    /// );
    /// assert_eq!(
    ///     GitUrl::normalize("https://gitlab.com/org/repo.git"),
    ///     "https://gitlab.com/org/repo.git"
    /// );
    /// ```
    pub fn normalize(url: &str) -> String {
        let trimmed = url.trim();
        match trimmed.strip_prefix(GITHUB_SSH_PREFIX) {
            Some(rest) => format!("{}{}", GITHUB_HTTPS_PREFIX, rest),
            None => trimmed.to_string(),
        }
    }

    /// scp形式（user@host:path）のURLかどうか
    pub fn is_scp_like(url: &str) -> bool {
        static SCP_LIKE: OnceLock<Regex> = OnceLock::new();
        SCP_LIKE
            .get_or_init(|| Regex::new(r"^[\w.-]+@[\w.-]+:[^/]").expect("scp pattern is valid"))
            .is_match(url.trim())
    }

    /// 正規化されたURL文字列を取得
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// トークンをユーザー名として埋め込んだURLを返す（パスワードは空）
    pub fn with_token(&self, token: &str) -> Result<String, GitUrlError> {
        let mut parsed =
            Url::parse(&self.url).map_err(|e| GitUrlError::InvalidFormat(e.to_string()))?;

        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(GitUrlError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        parsed
            .set_username(token)
            .map_err(|_| GitUrlError::InvalidFormat(self.url.clone()))?;
        parsed
            .set_password(None)
            .map_err(|_| GitUrlError::InvalidFormat(self.url.clone()))?;

        Ok(parsed.to_string())
    }

    /// ログ出力用に認証情報を取り除いたURLを返す
    pub fn redact(url: &str) -> String {
        match Url::parse(url) {
            Ok(mut parsed) if !parsed.username().is_empty() || parsed.password().is_some() => {
                let _ = parsed.set_username("");
                let _ = parsed.set_password(None);
                parsed.to_string()
            }
            _ => url.to_string(),
        }
    }
}

impl fmt::Display for GitUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
