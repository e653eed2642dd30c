//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::language::Language;

/// 翻译配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 基础配置
    /// 页面原文的语言
    pub source_lang: String,
    /// 一次性覆盖语言，不写入偏好存储
    pub language_override: Option<Language>,

    // 远程API
    pub api_url: String,
    pub api_key: Option<String>,

    // 翻译流程
    pub settle_delay_ms: u64,

    // 缓存与存储
    pub cache_persist: bool,
    pub cache_path: Option<PathBuf>,
    pub dictionary_path: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_lang: constants::DEFAULT_SOURCE_LANG.to_string(),
            language_override: None,
            api_url: constants::DEFAULT_API_URL.to_string(),
            api_key: None,
            settle_delay_ms: constants::DEFAULT_SETTLE_DELAY.as_millis() as u64,
            cache_persist: true,
            cache_path: None,
            dictionary_path: None,
            state_dir: None,
        }
    }
}

impl TranslationConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        let url = Url::parse(&self.api_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(TranslationError::ConfigError(format!(
                "API地址必须是 http 或 https: {}",
                self.api_url
            )));
        }

        if self.settle_delay() > constants::MAX_SETTLE_DELAY {
            return Err(TranslationError::ConfigError(format!(
                "等待时间过长: {}ms (最大 {}ms)",
                self.settle_delay_ms,
                constants::MAX_SETTLE_DELAY.as_millis()
            )));
        }

        if let Some(key) = &self.api_key {
            if key.trim().is_empty() {
                return Err(TranslationError::ConfigError("API密钥不能为空字符串".to_string()));
            }
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) -> TranslationResult<()> {
        use crate::env::{storage, translation, EnvVar};

        if translation::Language::is_set() {
            self.language_override = Some(translation::Language::get()?);
        }

        if translation::SourceLang::is_set() {
            self.source_lang = translation::SourceLang::get()?;
        }

        if translation::ApiUrl::is_set() {
            self.api_url = translation::ApiUrl::get()?;
            tracing::info!("环境变量覆盖 API URL: {}", self.api_url);
        }

        if translation::ApiKey::is_set() {
            self.api_key = Some(translation::ApiKey::get()?);
        }

        if translation::SettleDelay::is_set() {
            self.settle_delay_ms = translation::SettleDelay::get()?.as_millis() as u64;
        }

        if storage::StateDir::is_set() {
            self.state_dir = Some(storage::StateDir::get()?);
        }

        if storage::CachePersist::is_set() {
            self.cache_persist = storage::CachePersist::get()?;
        }

        Ok(())
    }

    /// 展开配置文件中路径的 `~`
    pub fn expand_paths(&mut self) {
        for path in [&mut self.cache_path, &mut self.dictionary_path, &mut self.state_dir]
            .into_iter()
            .flatten()
        {
            let expanded = match path.to_str() {
                Some(raw) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
                None => continue,
            };
            *path = expanded;
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// 缓存快照路径：显式配置优先，其次位于状态目录
    pub fn resolved_cache_path(&self) -> Option<PathBuf> {
        self.cache_path.clone().or_else(|| {
            self.state_dir
                .as_ref()
                .map(|dir| dir.join(constants::CACHE_FILE_NAME))
        })
    }

    /// 偏好文件路径
    pub fn preferences_path(&self) -> Option<PathBuf> {
        self.state_dir
            .as_ref()
            .map(|dir| dir.join(constants::PREFERENCES_FILE_NAME))
    }
}

/// 配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
}

impl ConfigManager {
    /// 搜索默认路径创建配置管理器
    pub fn new() -> TranslationResult<Self> {
        Self::load_dotenv();
        let config = Self::load_config()?;
        Self::finish(config)
    }

    /// 从指定文件创建配置管理器
    pub fn from_file(path: &Path) -> TranslationResult<Self> {
        Self::load_dotenv();
        let config = Self::load_from_file(path)?;
        Self::finish(config)
    }

    fn finish(mut config: TranslationConfig) -> TranslationResult<Self> {
        config.expand_paths();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 在搜索路径中查找配置文件
    fn load_config() -> TranslationResult<TranslationConfig> {
        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            let candidate = Path::new(expanded_path.as_ref());
            if candidate.exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(candidate);
            }
        }

        tracing::debug!("未找到配置文件，使用默认配置");
        Ok(TranslationConfig::default())
    }

    /// 从指定文件加载配置
    pub fn load_from_file(path: &Path) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::ConfigError(format!("读取配置文件失败: {}", e)).with_context(path.display())
        })?;

        if path.extension().map_or(false, |ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &Path) -> TranslationResult<()> {
        let config = TranslationConfig {
            api_key: Some("YOUR_API_KEY".to_string()),
            ..TranslationConfig::default()
        };
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
