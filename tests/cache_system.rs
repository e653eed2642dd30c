//! 缓存系统集成测试
//!
//! 测试会话缓存的共享、并发访问和快照持久化

use std::sync::Arc;
use std::thread;

use autotranslate::translation::config::constants;
use autotranslate::translation::{Language, TranslationCache, TranslationEntry};

mod common {
    include!("common/mod.rs");
}

use common::TestEnvironment;

/// 测试基本缓存操作
#[test]
fn test_basic_cache_operations() {
    let cache = TranslationCache::new();
    assert!(cache.is_empty());

    assert!(cache.insert(TranslationEntry::new("Hello", Language::Es, "Hola")));
    assert!(cache.insert(TranslationEntry::new("Hello", Language::It, "Ciao")));

    assert_eq!(cache.get("Hello", Language::Es).as_deref(), Some("Hola"));
    assert_eq!(cache.get("Hello", Language::It).as_deref(), Some("Ciao"));
    assert_eq!(cache.get("Hello", Language::Tr), None);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.source_count(), 1);
    assert_eq!(cache.count_for(Language::Es), 1);

    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.inserts, 2);

    cache.clear();
    assert!(cache.is_empty());
}

/// 键是精确匹配，不做任何规范化
#[test]
fn test_exact_key_matching() {
    let cache = TranslationCache::new();
    cache.insert(TranslationEntry::new("Hello", Language::Es, "Hola"));

    assert!(cache.get(" Hello", Language::Es).is_none());
    assert!(cache.get("hello", Language::Es).is_none());
    assert!(cache.get("Hello ", Language::Es).is_none());
}

/// 条目写入后不可变
#[test]
fn test_entries_are_immutable() {
    let cache = TranslationCache::new();
    assert!(cache.insert(TranslationEntry::new("Save", Language::Ar, "حفظ")));
    assert!(!cache.insert(TranslationEntry::new("Save", Language::Ar, "something else")));
    assert_eq!(cache.get("Save", Language::Ar).as_deref(), Some("حفظ"));
}

/// 多线程读写
#[test]
fn test_concurrent_access() {
    let cache = Arc::new(TranslationCache::new());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..250 {
                    let text = format!("text-{}", i);
                    cache.insert(TranslationEntry::new(text.clone(), Language::Es, format!("es-{}", i)));
                    assert!(cache.get(&text, Language::Es).is_some(), "worker {}", worker);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 250);
    assert_eq!(cache.stats().inserts, 250);
}

/// 远程翻译结果写入共享缓存
#[tokio::test]
async fn test_translator_populates_shared_cache() {
    let env = TestEnvironment::new();
    let texts = vec!["Open".to_string(), "Closed".to_string(), "Open".to_string()];

    env.translator.translate_batch(&texts, Language::Tr).await;

    assert_eq!(env.cache.len(), 2);
    assert_eq!(env.cache.get("Closed", Language::Tr).as_deref(), Some("tr:Closed"));

    // 另一个语言是独立的键
    env.translator.translate_batch(&texts, Language::Ar).await;
    assert_eq!(env.cache.len(), 4);
    assert_eq!(env.backend.call_count(), 2);
}

/// 快照在新会话中恢复
#[test]
fn test_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(constants::CACHE_FILE_NAME);

    let cache = TranslationCache::new();
    cache.insert(TranslationEntry::new("Hello", Language::Es, "Hola"));
    cache.insert(TranslationEntry::new("Hello", Language::It, "Ciao"));
    cache.insert(TranslationEntry::new("Bye", Language::Es, "Adiós"));
    assert_eq!(cache.save_snapshot(&path).unwrap(), 2);

    let restored = TranslationCache::new();
    assert_eq!(restored.load_snapshot(&path).unwrap(), 3);
    assert_eq!(restored.get("Hello", Language::It).as_deref(), Some("Ciao"));
    assert_eq!(restored.get("Bye", Language::Es).as_deref(), Some("Adiós"));
}

/// 快照只保留最近的原文，内存中不淘汰
#[test]
fn test_snapshot_keeps_most_recent_sources() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");

    let cache = TranslationCache::new();
    let total = constants::MAX_PERSISTED_SOURCES + 50;
    for i in 0..total {
        cache.insert(TranslationEntry::new(format!("source {}", i), Language::Es, format!("fuente {}", i)));
    }
    assert_eq!(cache.len(), total);

    assert_eq!(cache.save_snapshot(&path).unwrap(), constants::MAX_PERSISTED_SOURCES);

    let restored = TranslationCache::new();
    restored.load_snapshot(&path).unwrap();
    assert_eq!(restored.source_count(), constants::MAX_PERSISTED_SOURCES);
    assert!(!restored.contains("source 0", Language::Es));
    assert!(restored.contains(&format!("source {}", total - 1), Language::Es));
}

/// 缺失的快照视为空
#[test]
fn test_missing_snapshot_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let cache = TranslationCache::new();
    assert_eq!(cache.load_snapshot(&dir.path().join("absent.json")).unwrap(), 0);
    assert!(cache.is_empty());
}
