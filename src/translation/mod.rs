//! 翻译模块
//!
//! - **core**: 远程翻译客户端、翻译上下文与翻译流程
//! - **pipeline**: 文本节点遍历与批次去重
//! - **storage**: 翻译缓存
//! - **config**: 配置管理
//! - **dictionary**: 内置短语词典
//! - **language**: 语言选择与偏好存储
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use autotranslate::translation::{
//!     AutoTranslator, Dictionary, GoogleTranslateBackend, Language, RemoteTranslator, TranslationCache,
//! };
//!
//! # async fn example(dom: markup5ever_rcdom::RcDom) -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(GoogleTranslateBackend::new(
//!     "https://translation.googleapis.com/language/translate/v2",
//!     Some("API_KEY".to_string()),
//! )?);
//! let translator = RemoteTranslator::new(backend, Arc::new(TranslationCache::new()));
//! let auto = AutoTranslator::new(Language::Es, Arc::new(Dictionary::builtin()), translator);
//!
//! let report = auto.schedule_pass(&dom).await;
//! println!("已翻译 {} 个节点", report.applied);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 配置管理模块
pub mod config;

/// 核心翻译模块
pub mod core;

/// 短语词典
pub mod dictionary;

/// 错误处理模块
pub mod error;

/// 语言状态
pub mod language;

/// 文本处理管道模块
pub mod pipeline;

/// 存储管理模块
pub mod storage;

// ============================================================================
// 重新导出
// ============================================================================

pub use config::{ConfigManager, TranslationConfig};
pub use self::core::{
    AutoTranslator, GoogleTranslateBackend, PassOutcome, PassReport, RemoteTranslator, SkipReason,
    TranslationBackend, TranslationContext, TranslatorStats,
};
pub use dictionary::Dictionary;
pub use error::{ErrorCategory, TranslationError, TranslationResult};
pub use language::{FilePreferenceStore, Language, LanguageState, MemoryPreferenceStore, PreferenceStore};
pub use pipeline::{Batch, TextNodeCandidate, TextNodeWalker};
pub use storage::{CacheStats, TranslationCache, TranslationEntry};
