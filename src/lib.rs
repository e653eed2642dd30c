//! # Autotranslate
//!
//! 自动翻译HTML页面中的可见文本：词典优先，其余文本去重后批量交给
//! 远程翻译API，结果写回原节点并保留首尾空白。
//!
//! ## 模块组织
//!
//! - `core` - 文档级入口和会话组装
//! - `env` - 类型化的环境变量
//! - `parsers` - HTML解析与序列化
//! - `translation` - 翻译功能

pub mod core;
pub mod env;
pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use crate::core::{load_dictionary, translate_document, TranslatedDocument, TranslationSession};
pub use parsers::*;
pub use translation::{AutoTranslator, Language, TranslationConfig, TranslationError, TranslationResult};
