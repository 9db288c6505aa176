use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use validator::Validate;

use crate::common::error::DgitError;
use crate::common::result::{DgitResult, OptionExt};

/// コンテンツストアへの接続プロトコル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    #[default]
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
        }
    }
}

/// コンテンツアドレス型ストアの接続先（ゲートウェイ）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
pub struct ContentSource {
    /// ホスト名
    #[validate(length(min = 1))]
    pub host: String,

    /// ポート番号
    #[validate(range(min = 1))]
    pub port: u16,

    /// プロトコル
    #[serde(default)]
    pub protocol: Protocol,

    /// CIDを連結して閲覧用URLを作るためのベースURL
    #[validate(url)]
    pub base_url: String,
}

impl ContentSource {
    /// 新しいContentSourceインスタンスを作成
    pub fn new(
        host: impl Into<String>,
        port: u16,
        protocol: Protocol,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            protocol,
            base_url: base_url.into(),
        }
    }

    /// ホスティングされたプライマリソース
    pub fn hosted() -> Self {
        Self::new(
            "jqgt.remixproject.org",
            443,
            Protocol::Https,
            "https://jqgt.remixproject.org/ipfs/",
        )
    }

    /// 公開フォールバックゲートウェイ
    pub fn public_gateway() -> Self {
        Self::new("ipfs.io", 443, Protocol::Https, "https://ipfs.io/ipfs/")
    }

    /// `https://host:port` 形式の文字列からソースを作成
    ///
    /// ```
    /// use dgit::domain::value_objects::content_source::{ContentSource, Protocol};
    ///
    /// let source = ContentSource::parse("http://127.0.0.1:5001").unwrap();
    /// assert_eq!(source.port, 5001);
    /// assert_eq!(source.protocol, Protocol::Http);
    /// assert_eq!(source.base_url, "http://127.0.0.1:5001/ipfs/");
    /// ```
    pub fn parse(endpoint: &str) -> DgitResult<Self> {
        let parsed = Url::parse(endpoint.trim()).map_err(|e| {
            DgitError::validation_error("endpoint", e.to_string(), Some(endpoint.to_string()))
        })?;

        let protocol = match parsed.scheme() {
            "http" => Protocol::Http,
            "https" => Protocol::Https,
            other => {
                return Err(DgitError::validation_error(
                    "endpoint",
                    format!("unsupported protocol '{}'", other),
                    Some(endpoint.to_string()),
                ))
            }
        };

        let host = parsed
            .host_str()
            .ok_or_validation_error("endpoint", "missing host")?
            .to_string();
        let port = parsed
            .port_or_known_default()
            .ok_or_validation_error("endpoint", "missing port")?;

        let base_url = match parsed.port() {
            Some(port) => format!("{}://{}:{}/ipfs/", protocol, host, port),
            None => format!("{}://{}/ipfs/", protocol, host),
        };

        let source = Self::new(host, port, protocol, base_url);
        source.validate()?;
        Ok(source)
    }

    /// HTTP RPC APIのベースURL
    pub fn api_url(&self) -> String {
        format!("{}://{}:{}/api/v0", self.protocol, self.host, self.port)
    }

    /// CIDの閲覧用URL
    pub fn gateway_url(&self, cid: &str) -> String {
        format!("{}{}", self.base_url, cid)
    }
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// ソースの役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceSlot {
    /// ホスティングされたプライマリソース
    Primary,
    /// ユーザー設定のソース
    User,
    /// 公開フォールバック
    Public,
}

impl fmt::Display for SourceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSlot::Primary => write!(f, "primary"),
            SourceSlot::User => write!(f, "user"),
            SourceSlot::Public => write!(f, "public"),
        }
    }
}

/// 優先順位付きのソース構成
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContentSources {
    /// エクスポートとピン留めの可用性コピーに使うソース
    #[validate(nested)]
    pub primary: ContentSource,

    /// ユーザーが設定したソース
    #[validate(nested)]
    pub user: ContentSource,

    /// 公開フォールバック
    #[validate(nested)]
    pub public: ContentSource,
}

impl Default for ContentSources {
    fn default() -> Self {
        Self {
            primary: ContentSource::hosted(),
            user: ContentSource::hosted(),
            public: ContentSource::public_gateway(),
        }
    }
}

impl ContentSources {
    /// ユーザーソースを差し替える
    pub fn with_user(mut self, source: ContentSource) -> Self {
        self.user = source;
        self
    }

    /// インポート時の試行順（primary → user → public）
    pub fn priority_order(&self) -> [(SourceSlot, &ContentSource); 3] {
        [
            (SourceSlot::Primary, &self.primary),
            (SourceSlot::User, &self.user),
            (SourceSlot::Public, &self.public),
        ]
    }

    /// 役割に対応するソースを取得
    pub fn get(&self, slot: SourceSlot) -> &ContentSource {
        match slot {
            SourceSlot::Primary => &self.primary,
            SourceSlot::User => &self.user,
            SourceSlot::Public => &self.public,
        }
    }
}
