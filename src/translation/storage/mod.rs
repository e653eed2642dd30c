//! 存储模块
//!
//! 提供翻译缓存及其快照持久化。

pub mod cache;

pub use cache::{CacheKey, CacheStats, TranslationCache, TranslationEntry};
