//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 变量是否被显式设置
    fn is_set() -> bool {
        env::var_os(Self::NAME).is_some()
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "AUTOTRANSLATE_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;
    use crate::translation::language::Language as UiLanguage;

    /// 一次性覆盖当前语言（不持久化）
    pub struct Language;
    impl EnvVar<UiLanguage> for Language {
        const NAME: &'static str = "AUTOTRANSLATE_LANGUAGE";
        const DEFAULT: Option<UiLanguage> = None;
        const DESCRIPTION: &'static str = "Override the selected language: en, es, it, tr, ar";

        fn parse(value: &str) -> EnvResult<UiLanguage> {
            value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: format!("Unsupported language '{}'. Use: en, es, it, tr, ar", value),
            })
        }
    }

    /// 源语言
    pub struct SourceLang;
    impl EnvVar<String> for SourceLang {
        const NAME: &'static str = "AUTOTRANSLATE_SOURCE_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Source language of the page text (ISO 639-1 code)";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("en".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim().to_lowercase();
            if lang.len() == 2 && lang.chars().all(|c| c.is_ascii_alphabetic()) {
                Ok(lang)
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Language code must be 2 letters (ISO 639-1)".to_string(),
                })
            }
        }
    }

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "AUTOTRANSLATE_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Translation API endpoint URL";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::translation::config::constants::DEFAULT_API_URL.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// API 密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "AUTOTRANSLATE_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "API key for the translation service";

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API key must not be empty".to_string(),
                })
            } else {
                Ok(key.to_string())
            }
        }
    }

    /// 语言切换后的稳定等待时间
    pub struct SettleDelay;
    impl EnvVar<Duration> for SettleDelay {
        const NAME: &'static str = "AUTOTRANSLATE_SETTLE_DELAY_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(500));
        const DESCRIPTION: &'static str = "Delay in milliseconds before a translation pass starts";

        fn parse(value: &str) -> EnvResult<Duration> {
            let millis = parse_positive_usize(value, Self::NAME, 0, 10_000)?;
            Ok(Duration::from_millis(millis as u64))
        }
    }
}

/// 存储相关环境变量
pub mod storage {
    use super::*;

    /// 状态目录（语言偏好与缓存快照）
    pub struct StateDir;
    impl EnvVar<PathBuf> for StateDir {
        const NAME: &'static str = "AUTOTRANSLATE_STATE_DIR";
        const DEFAULT: Option<PathBuf> = None;
        const DESCRIPTION: &'static str = "Directory holding the language preference and cache snapshot";

        fn parse(value: &str) -> EnvResult<PathBuf> {
            if value.trim().is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Path must not be empty".to_string(),
                });
            }
            Ok(PathBuf::from(shellexpand::tilde(value.trim()).as_ref()))
        }
    }

    /// 是否持久化翻译缓存
    pub struct CachePersist;
    impl EnvVar<bool> for CachePersist {
        const NAME: &'static str = "AUTOTRANSLATE_CACHE_PERSIST";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Persist the translation cache between runs";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

// 辅助解析函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off", value),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    fn line(docs: &mut String, name: &str, description: &str) {
        docs.push_str(&format!("- `{}`: {}\n", name, description));
    }

    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    docs.push_str("## Core\n\n");
    line(&mut docs, core::LogLevel::NAME, core::LogLevel::DESCRIPTION);
    line(&mut docs, core::NoColor::NAME, core::NoColor::DESCRIPTION);

    docs.push_str("\n## Translation\n\n");
    line(&mut docs, translation::Language::NAME, translation::Language::DESCRIPTION);
    line(&mut docs, translation::SourceLang::NAME, translation::SourceLang::DESCRIPTION);
    line(&mut docs, translation::ApiUrl::NAME, translation::ApiUrl::DESCRIPTION);
    line(&mut docs, translation::ApiKey::NAME, translation::ApiKey::DESCRIPTION);
    line(&mut docs, translation::SettleDelay::NAME, translation::SettleDelay::DESCRIPTION);

    docs.push_str("\n## Storage\n\n");
    line(&mut docs, storage::StateDir::NAME, storage::StateDir::DESCRIPTION);
    line(&mut docs, storage::CachePersist::NAME, storage::CachePersist::DESCRIPTION);

    docs
}
