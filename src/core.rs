//! 文档级入口
//!
//! [`TranslationSession`] 按配置组装缓存、词典和远程翻译器；
//! [`translate_document`] 完成 字节 -> DOM -> 翻译流程 -> 字节 的整个过程。

use std::path::Path;
use std::sync::Arc;

use crate::parsers::html::{html_to_dom, serialize_document, set_document_language};
use crate::translation::config::TranslationConfig;
use crate::translation::core::client::{GoogleTranslateBackend, RemoteTranslator, TranslationBackend};
use crate::translation::core::service::{AutoTranslator, PassReport};
use crate::translation::dictionary::Dictionary;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::language::Language;
use crate::translation::storage::cache::TranslationCache;

#[cfg(feature = "cli")]
const ANSI_COLOR_RED: &str = "\x1b[31m";
#[cfg(feature = "cli")]
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// 翻译后的文档
#[derive(Debug, Clone)]
pub struct TranslatedDocument {
    pub data: Vec<u8>,
    pub report: PassReport,
}

/// 一次会话共享的翻译资源
pub struct TranslationSession {
    config: TranslationConfig,
    cache: Arc<TranslationCache>,
    dictionary: Arc<Dictionary>,
    translator: RemoteTranslator,
}

impl TranslationSession {
    /// 使用 Google 翻译后端
    pub fn from_config(config: TranslationConfig) -> TranslationResult<Self> {
        let backend = Arc::new(GoogleTranslateBackend::from_config(&config)?);
        Self::with_backend(config, backend)
    }

    /// 使用指定后端
    pub fn with_backend(
        config: TranslationConfig,
        backend: Arc<dyn TranslationBackend>,
    ) -> TranslationResult<Self> {
        let cache = Arc::new(TranslationCache::new());
        if config.cache_persist {
            if let Some(path) = config.resolved_cache_path() {
                match cache.load_snapshot(&path) {
                    Ok(count) => tracing::debug!("从 {} 恢复 {} 条缓存译文", path.display(), count),
                    // 损坏的快照不影响本次运行
                    Err(e) => tracing::warn!("忽略缓存快照 {}: {}", path.display(), e),
                }
            }
        }

        let dictionary = Arc::new(load_dictionary(&config)?);
        let translator = RemoteTranslator::with_source_lang(backend, Arc::clone(&cache), config.source_lang.clone());

        Ok(Self {
            config,
            cache,
            dictionary,
            translator,
        })
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    pub fn translator(&self) -> &RemoteTranslator {
        &self.translator
    }

    /// 创建绑定指定语言的自动翻译器
    pub fn auto_translator(&self, language: Language) -> AutoTranslator {
        AutoTranslator::new(language, Arc::clone(&self.dictionary), self.translator.clone())
            .with_settle_delay(self.config.settle_delay())
    }

    /// 保存缓存快照，未启用持久化时返回 `None`
    pub fn save_cache(&self) -> TranslationResult<Option<usize>> {
        if !self.config.cache_persist {
            return Ok(None);
        }
        match self.config.resolved_cache_path() {
            Some(path) => {
                let saved = self.cache.save_snapshot(&path)?;
                tracing::debug!("缓存快照已保存: {} ({} 条原文)", path.display(), saved);
                Ok(Some(saved))
            }
            None => Ok(None),
        }
    }
}

/// 加载内置词典，并合并配置中的自定义词典
pub fn load_dictionary(config: &TranslationConfig) -> TranslationResult<Dictionary> {
    let builtin = Dictionary::builtin();
    match &config.dictionary_path {
        Some(path) => {
            let custom = read_dictionary_file(path)?;
            Ok(builtin.merge(custom))
        }
        None => Ok(builtin),
    }
}

fn read_dictionary_file(path: &Path) -> TranslationResult<Dictionary> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TranslationError::StorageError(format!("读取词典失败: {}", e)).with_context(path.display())
    })?;
    Dictionary::from_toml_str(&content).map_err(|e| e.with_context(path.display()))
}

/// 翻译整个HTML文档
///
/// 等待设定的稳定时间后执行一次翻译流程，并在 `<html>` 上标记语言。
pub async fn translate_document(
    data: &[u8],
    document_encoding: &str,
    auto: &AutoTranslator,
) -> TranslationResult<TranslatedDocument> {
    let dom = html_to_dom(data, document_encoding)?;
    let report = auto.schedule_pass(&dom).await;
    set_document_language(&dom, auto.language());
    let data = serialize_document(&dom, document_encoding)?;

    Ok(TranslatedDocument { data, report })
}

#[cfg(feature = "cli")]
fn use_color(stream: atty::Stream) -> bool {
    use crate::env::{core::NoColor, EnvVar};

    atty::is(stream) && !NoColor::get_or_default(false)
}

/// 向标准错误输出错误信息
#[cfg(feature = "cli")]
pub fn print_error_message(msg: &str) {
    if use_color(atty::Stream::Stderr) {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}

/// 向标准输出输出提示信息
#[cfg(feature = "cli")]
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    #[derive(Debug)]
    struct BracketBackend;

    #[async_trait]
    impl TranslationBackend for BracketBackend {
        async fn translate(&self, texts: &[String], _: &str, _: Language) -> TranslationResult<Vec<String>> {
            Ok(texts.iter().map(|t| format!("<{}>", t)).collect())
        }
    }

    fn config_in(dir: &Path) -> TranslationConfig {
        TranslationConfig {
            settle_delay_ms: 0,
            state_dir: Some(dir.to_path_buf()),
            ..TranslationConfig::default()
        }
    }

    #[tokio::test]
    async fn test_translate_document_tags_language() {
        let dir = tempfile::tempdir().unwrap();
        let session = TranslationSession::with_backend(config_in(dir.path()), Arc::new(BracketBackend)).unwrap();
        let auto = session.auto_translator(Language::Es);
        assert_eq!(auto.settle_delay(), Duration::ZERO);

        let doc = translate_document(b"<html><body><p>Save</p><p>Report</p></body></html>", "utf-8", &auto)
            .await
            .unwrap();
        let html = String::from_utf8(doc.data).unwrap();

        assert!(html.starts_with("<html lang=\"es\" dir=\"ltr\">"));
        assert!(html.contains("<p>Guardar</p>"));
        assert!(html.contains("<p>&lt;Report&gt;</p>"));
        assert_eq!(doc.report.applied, 2);
    }

    #[tokio::test]
    async fn test_session_persists_cache_between_runs() {
        let dir = tempfile::tempdir().unwrap();

        let first = TranslationSession::with_backend(config_in(dir.path()), Arc::new(BracketBackend)).unwrap();
        first.translator().translate("Pipeline", Language::It).await;
        assert_eq!(first.save_cache().unwrap(), Some(1));

        let second = TranslationSession::with_backend(config_in(dir.path()), Arc::new(BracketBackend)).unwrap();
        assert_eq!(second.cache().get("Pipeline", Language::It).as_deref(), Some("<Pipeline>"));
    }

    #[test]
    fn test_cache_persistence_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let config = TranslationConfig {
            cache_persist: false,
            ..config_in(dir.path())
        };
        let session = TranslationSession::with_backend(config, Arc::new(BracketBackend)).unwrap();
        assert_eq!(session.save_cache().unwrap(), None);
    }

    #[test]
    fn test_custom_dictionary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phrases.toml");
        std::fs::write(&path, "[es]\n\"Save\" = \"Guardar cambios\"\n").unwrap();

        let config = TranslationConfig {
            dictionary_path: Some(path),
            ..config_in(dir.path())
        };
        let dictionary = load_dictionary(&config).unwrap();
        assert_eq!(dictionary.lookup("Save", Language::Es), "Guardar cambios");
        assert_eq!(dictionary.lookup("Save", Language::It), "Salva");

        let missing = TranslationConfig {
            dictionary_path: Some(dir.path().join("missing.toml")),
            ..config_in(dir.path())
        };
        assert!(matches!(load_dictionary(&missing), Err(TranslationError::StorageError(_))));
    }
}
