//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use std::fmt;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 翻译API返回的错误
    #[error("翻译API错误 (状态码 {status}): {message}")]
    ApiError { status: u16, message: String },

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 缓存错误
    #[error("缓存错误: {0}")]
    CacheError(String),

    /// 偏好存储错误
    #[error("存储错误: {0}")]
    StorageError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl TranslationError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::NetworkError(_) => true,
            TranslationError::ApiError { status, .. } => *status == 429 || *status >= 500,
            TranslationError::CacheError(_) => true,
            TranslationError::StorageError(_) => true,
            TranslationError::ConfigError(_)
            | TranslationError::InvalidInput(_)
            | TranslationError::ParseError(_)
            | TranslationError::SerializationError(_)
            | TranslationError::InternalError(_) => false,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::ApiError { .. } => ErrorCategory::Service,
            TranslationError::InvalidInput(_) => ErrorCategory::Input,
            TranslationError::CacheError(_) => ErrorCategory::Cache,
            TranslationError::StorageError(_) => ErrorCategory::Storage,
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        let append = |msg: &mut String| *msg = format!("{} (上下文: {})", msg, context);

        match &mut self {
            TranslationError::ConfigError(msg)
            | TranslationError::NetworkError(msg)
            | TranslationError::InvalidInput(msg)
            | TranslationError::CacheError(msg)
            | TranslationError::StorageError(msg)
            | TranslationError::ParseError(msg)
            | TranslationError::SerializationError(msg)
            | TranslationError::InternalError(msg) => append(msg),
            TranslationError::ApiError { message, .. } => append(message),
        }

        self
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Service,
    Input,
    Cache,
    Storage,
    Parsing,
    Serialization,
    Internal,
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::StorageError(format!("IO错误: {}", error))
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<url::ParseError> for TranslationError {
    fn from(error: url::ParseError) -> Self {
        TranslationError::ConfigError(format!("URL无效: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            TranslationError::ApiError {
                status: status.as_u16(),
                message: error.to_string(),
            }
        } else if error.is_decode() {
            TranslationError::SerializationError(format!("响应解析失败: {}", error))
        } else {
            TranslationError::NetworkError(error.to_string())
        }
    }
}

impl From<crate::env::EnvError> for TranslationError {
    fn from(error: crate::env::EnvError) -> Self {
        TranslationError::ConfigError(error.to_string())
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TranslationError::NetworkError("reset".to_string()).is_retryable());
        assert!(TranslationError::ApiError {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_retryable());
        assert!(!TranslationError::ApiError {
            status: 403,
            message: "forbidden".to_string()
        }
        .is_retryable());
        assert!(!TranslationError::ConfigError("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_with_context_appends_message() {
        let error = TranslationError::CacheError("写入失败".to_string()).with_context("snapshot.json");
        assert!(error.to_string().contains("snapshot.json"));
        assert_eq!(error.category(), ErrorCategory::Cache);

        let api = TranslationError::ApiError {
            status: 500,
            message: "boom".to_string(),
        }
        .with_context("batch");
        assert!(api.to_string().contains("boom (上下文: batch)"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: TranslationError = io.into();
        assert_eq!(error.category(), ErrorCategory::Storage);
    }
}
