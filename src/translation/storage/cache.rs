//! 翻译缓存模块
//!
//! 会话级别的翻译结果缓存，键为 (原文, 目标语言)，精确匹配。
//! 内存中不做淘汰，缓存随会话增长；只有落盘快照有数量上限。

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::translation::config::constants;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::language::Language;

// ============================================================================
// 核心类型
// ============================================================================

/// 缓存条目，写入后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationEntry {
    pub source_text: String,
    pub language: Language,
    pub translated_text: String,
}

impl TranslationEntry {
    pub fn new(source_text: impl Into<String>, language: Language, translated_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            language,
            translated_text: translated_text.into(),
        }
    }
}

/// 缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source_text: String,
    pub language: Language,
}

impl CacheKey {
    pub fn new(source_text: &str, language: Language) -> Self {
        Self {
            source_text: source_text.to_string(),
            language,
        }
    }
}

#[derive(Debug)]
struct StoredTranslation {
    translated_text: String,
    /// 插入序号，用于快照时保留最近的条目
    sequence: u64,
}

/// 缓存统计信息
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub total_entries: usize,
}

impl CacheStats {
    /// 计算缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// 翻译缓存
///
/// 通过 `Arc` 在整个会话中共享，所有方法只需 `&self`。
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: DashMap<CacheKey, StoredTranslation>,
    sequence: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
}

/// 落盘快照格式：原文 -> 语言 -> 译文
#[derive(Debug, Serialize, Deserialize)]
struct CacheSnapshot {
    version: u32,
    saved_at: DateTime<Utc>,
    entries: BTreeMap<String, BTreeMap<Language, String>>,
}

// ============================================================================
// 实现
// ============================================================================

impl TranslationCache {
    /// 创建新的翻译缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取缓存的译文
    pub fn get(&self, text: &str, language: Language) -> Option<String> {
        match self.entries.get(&CacheKey::new(text, language)) {
            Some(stored) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(stored.translated_text.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// 检查是否包含指定键，不计入统计
    pub fn contains(&self, text: &str, language: Language) -> bool {
        self.entries.contains_key(&CacheKey::new(text, language))
    }

    /// 插入缓存条目
    ///
    /// 条目不可变：键已存在时保留旧值并返回 `false`。
    pub fn insert(&self, entry: TranslationEntry) -> bool {
        let key = CacheKey {
            source_text: entry.source_text,
            language: entry.language,
        };

        match self.entries.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
                vacant.insert(StoredTranslation {
                    translated_text: entry.translated_text,
                    sequence,
                });
                self.inserts.fetch_add(1, Ordering::Relaxed);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 清空缓存
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// 获取统计信息
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            total_entries: self.entries.len(),
        }
    }

    /// 不同原文的数量
    pub fn source_count(&self) -> usize {
        let mut sources = std::collections::HashSet::new();
        for item in self.entries.iter() {
            sources.insert(item.key().source_text.clone());
        }
        sources.len()
    }

    /// 指定语言的译文数量
    pub fn count_for(&self, language: Language) -> usize {
        self.entries
            .iter()
            .filter(|item| item.key().language == language)
            .count()
    }

    /// 保存快照
    ///
    /// 最多保留 `MAX_PERSISTED_SOURCES` 个原文，按最近插入排序。
    /// 返回写入的原文数量。
    pub fn save_snapshot(&self, path: &Path) -> TranslationResult<usize> {
        // 每个原文取其最新一次插入的序号
        let mut latest: HashMap<String, u64> = HashMap::new();
        for item in self.entries.iter() {
            let seq = latest.entry(item.key().source_text.clone()).or_insert(0);
            *seq = (*seq).max(item.value().sequence);
        }

        let mut ordered: Vec<(String, u64)> = latest.into_iter().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));
        ordered.truncate(constants::MAX_PERSISTED_SOURCES);

        let mut entries: BTreeMap<String, BTreeMap<Language, String>> = BTreeMap::new();
        for (source, _) in &ordered {
            for lang in Language::ALL {
                if let Some(stored) = self.entries.get(&CacheKey::new(source, lang)) {
                    entries
                        .entry(source.clone())
                        .or_default()
                        .insert(lang, stored.translated_text.clone());
                }
            }
        }

        let snapshot = CacheSnapshot {
            version: constants::CACHE_SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            entries,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(&snapshot)?;
        fs::write(path, content).map_err(|e| {
            TranslationError::CacheError(format!("写入缓存快照失败: {}", e))
                .with_context(path.display())
        })?;

        tracing::debug!("缓存快照已保存: {} 个原文 -> {}", ordered.len(), path.display());
        Ok(ordered.len())
    }

    /// 载入快照，返回新增条目数
    ///
    /// 文件不存在视为空快照；已存在的键不会被覆盖。
    pub fn load_snapshot(&self, path: &Path) -> TranslationResult<usize> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let snapshot: CacheSnapshot = serde_json::from_str(&content).map_err(|e| {
            TranslationError::CacheError(format!("缓存快照损坏: {}", e)).with_context(path.display())
        })?;

        if snapshot.version != constants::CACHE_SNAPSHOT_VERSION {
            return Err(TranslationError::CacheError(format!(
                "不支持的缓存快照版本: {}",
                snapshot.version
            )));
        }

        let mut loaded = 0;
        for (source, translations) in snapshot.entries {
            for (lang, translated) in translations {
                if self.insert(TranslationEntry::new(source.clone(), lang, translated)) {
                    loaded += 1;
                }
            }
        }

        tracing::debug!("从 {} 载入 {} 条缓存", path.display(), loaded);
        Ok(loaded)
    }
}
