use crate::common::error::DgitError;

/// dgit全体で使用するResult型のエイリアス
///
/// # Examples
///
/// ```
/// use dgit::common::result::DgitResult;
/// use dgit::common::error::DgitError;
///
/// fn example_function() -> DgitResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> DgitResult<()> {
///     Err(DgitError::internal_error("Something went wrong"))
/// }
/// ```
pub type DgitResult<T> = Result<T, DgitError>;

/// Optionのエラー変換ヘルパー
pub trait OptionExt<T> {
    /// Option値をValidationErrorに変換する
    ///
    /// # Examples
    ///
    /// ```
    /// use dgit::common::result::{DgitResult, OptionExt};
    ///
    /// let none_value: Option<String> = None;
    /// let result: DgitResult<String> = none_value.ok_or_validation_error("host", "required");
    /// assert!(result.is_err());
    /// ```
    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> DgitResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> DgitResult<T> {
        self.ok_or_else(|| DgitError::validation_error(field, message, None))
    }
}

/// Resultのエラー変換ヘルパー
pub trait ResultExt<T, E> {
    /// ファイルシステムエラーとしてDgitResultに変換
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> DgitResult<T>
    where
        E: Into<std::io::Error>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> DgitResult<T>
    where
        E: Into<std::io::Error>,
    {
        self.map_err(|e| {
            let io_error = e.into();
            DgitError::filesystem_error_with_source(message, path, io_error)
        })
    }
}

/// チェーンオペレーション用のヘルパー
pub trait DgitResultExt<T> {
    /// エラー時にコンテキストを追加
    fn with_context(self, context: impl Into<String>) -> DgitResult<T>;

    /// Optionに変換（エラーをログ出力）
    fn to_option_logged(self) -> Option<T>;

    /// デフォルト値でエラーを無視
    fn unwrap_or_default_logged(self) -> T
    where
        T: Default;
}

impl<T> DgitResultExt<T> for DgitResult<T> {
    fn with_context(self, context: impl Into<String>) -> DgitResult<T> {
        self.map_err(|e| DgitError::internal_error_with_source(context, e))
    }

    fn to_option_logged(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("DgitResult error: {}", e);
                None
            }
        }
    }

    fn unwrap_or_default_logged(self) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("DgitResult error, using default: {}", e);
                T::default()
            }
        }
    }
}

/// async関数用のヘルパー
pub mod async_helpers {
    use super::{DgitError, DgitResult};
    use std::future::Future;

    /// タイムアウト付きasync実行
    pub async fn with_timeout<F, T>(f: F, timeout_secs: u64) -> DgitResult<T>
    where
        F: Future<Output = DgitResult<T>>,
    {
        let timeout_duration = std::time::Duration::from_secs(timeout_secs);

        match tokio::time::timeout(timeout_duration, f).await {
            Ok(result) => result,
            Err(_) => Err(DgitError::timeout(timeout_secs)),
        }
    }
}
