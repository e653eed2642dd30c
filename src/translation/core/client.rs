//! 远程翻译客户端
//!
//! [`TranslationBackend`] 抽象一次远程请求（一组文本），[`RemoteTranslator`]
//! 在其上叠加缓存、批内去重、并发请求合并与失败降级：翻译失败只会
//! 记录日志并返回原文，永远不会把错误抛给调用方。

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::translation::config::{constants, TranslationConfig};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::language::Language;
use crate::translation::pipeline::batch::Batch;
use crate::translation::storage::cache::{CacheKey, TranslationCache, TranslationEntry};

/// 翻译后端
///
/// 一次调用对应一次远程请求，返回值与 `texts` 一一对应。
#[async_trait]
pub trait TranslationBackend: Send + Sync + fmt::Debug {
    async fn translate(
        &self,
        texts: &[String],
        source: &str,
        target: Language,
    ) -> TranslationResult<Vec<String>>;

    /// 后端名称，用于日志
    fn name(&self) -> &str {
        "backend"
    }
}

// ============================================================================
// Google Cloud Translation v2
// ============================================================================

#[derive(Debug, Serialize)]
struct GoogleRequest<'a> {
    q: &'a [String],
    target: &'a str,
    source: &'a str,
    format: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    data: GoogleData,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleData {
    #[serde(default)]
    translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
struct GoogleTranslation {
    #[serde(rename = "translatedText", default)]
    translated_text: String,
}

/// Google 翻译后端
///
/// 不设置请求超时，沿用传输层默认行为。
pub struct GoogleTranslateBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl fmt::Debug for GoogleTranslateBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 不输出密钥
        f.debug_struct("GoogleTranslateBackend")
            .field("api_url", &self.api_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl GoogleTranslateBackend {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> TranslationResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
        })
    }

    pub fn from_config(config: &TranslationConfig) -> TranslationResult<Self> {
        Self::new(config.api_url.clone(), config.api_key.clone())
    }

    fn endpoint(&self) -> TranslationResult<Url> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TranslationError::ConfigError("未配置翻译API密钥".to_string()))?;

        Ok(Url::parse_with_params(&self.api_url, &[("key", key)])?)
    }
}

impl Default for GoogleTranslateBackend {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: constants::DEFAULT_API_URL.to_string(),
            api_key: None,
        }
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslateBackend {
    async fn translate(
        &self,
        texts: &[String],
        source: &str,
        target: Language,
    ) -> TranslationResult<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let endpoint = self.endpoint()?;
        let request = GoogleRequest {
            q: texts,
            target: target.code(),
            source,
            format: "text",
        };

        let response = self.client.post(endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: GoogleResponse = response.json().await?;
        Ok(body
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }

    fn name(&self) -> &str {
        "google-translate-v2"
    }
}

// ============================================================================
// 带缓存的远程翻译器
// ============================================================================

/// 远程翻译统计
#[derive(Debug, Default)]
pub struct TranslatorStats {
    remote_requests: AtomicUsize,
    texts_sent: AtomicUsize,
    failures: AtomicUsize,
    cache_hits: AtomicUsize,
    coalesced: AtomicUsize,
}

impl TranslatorStats {
    /// 远程请求次数
    pub fn remote_requests(&self) -> usize {
        self.remote_requests.load(Ordering::Relaxed)
    }

    /// 发送到远程的文本条数
    pub fn texts_sent(&self) -> usize {
        self.texts_sent.load(Ordering::Relaxed)
    }

    /// 失败的远程请求次数
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// 复用进行中请求的次数
    pub fn coalesced(&self) -> usize {
        self.coalesced.load(Ordering::Relaxed)
    }
}

type PendingTranslation = Shared<BoxFuture<'static, String>>;

/// 调用方完成或被取消时清理进行中请求表
///
/// 请求已完成，或者本调用方是最后一个等待者时移除条目。
struct PendingGuard<'a> {
    pending: &'a DashMap<CacheKey, PendingTranslation>,
    key: CacheKey,
    future: PendingTranslation,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let future = &self.future;
        self.pending.remove_if(&self.key, |_, pending| {
            pending.peek().is_some() || (pending.ptr_eq(future) && pending.strong_count() == Some(2))
        });
    }
}

struct Inner {
    backend: Arc<dyn TranslationBackend>,
    cache: Arc<TranslationCache>,
    source_lang: String,
    stats: TranslatorStats,
    pending: DashMap<CacheKey, PendingTranslation>,
}

/// 远程翻译器
///
/// 克隆开销很小，所有克隆共享同一缓存、统计和进行中请求表。
#[derive(Clone)]
pub struct RemoteTranslator {
    inner: Arc<Inner>,
}

impl fmt::Debug for RemoteTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTranslator")
            .field("backend", &self.inner.backend.name())
            .field("source_lang", &self.inner.source_lang)
            .field("cached", &self.inner.cache.len())
            .finish()
    }
}

impl RemoteTranslator {
    pub fn new(backend: Arc<dyn TranslationBackend>, cache: Arc<TranslationCache>) -> Self {
        Self::with_source_lang(backend, cache, constants::DEFAULT_SOURCE_LANG)
    }

    pub fn with_source_lang(
        backend: Arc<dyn TranslationBackend>,
        cache: Arc<TranslationCache>,
        source_lang: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                cache,
                source_lang: source_lang.into(),
                stats: TranslatorStats::default(),
                pending: DashMap::new(),
            }),
        }
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.inner.cache
    }

    pub fn stats(&self) -> &TranslatorStats {
        &self.inner.stats
    }

    pub fn source_lang(&self) -> &str {
        &self.inner.source_lang
    }

    /// 批量翻译
    ///
    /// 返回与 `texts` 平行的列表。未命中缓存的文本去重后只发起一次远程请求；
    /// 失败时对应条目保留原文。
    pub async fn translate_batch(&self, texts: &[String], language: Language) -> Vec<String> {
        if language.is_noop() {
            return texts.to_vec();
        }

        let cache = &self.inner.cache;
        let stats = &self.inner.stats;

        let mut results: Vec<Option<String>> = vec![None; texts.len()];
        let mut misses: Vec<usize> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            if text.trim().is_empty() {
                results[i] = Some(text.clone());
            } else if let Some(hit) = cache.get(text, language) {
                stats.cache_hits.fetch_add(1, Ordering::Relaxed);
                results[i] = Some(hit);
            } else {
                misses.push(i);
            }
        }

        if !misses.is_empty() {
            let batch = Batch::plan(misses.iter().map(|&i| texts[i].as_str()));
            let translated = self.fetch(&batch, language).await;
            let expanded = batch.expand(&translated);

            for (&i, value) in misses.iter().zip(expanded) {
                results[i] = value.flatten();
            }
        }

        results
            .into_iter()
            .zip(texts)
            .map(|(result, original)| result.unwrap_or_else(|| original.clone()))
            .collect()
    }

    /// 发送一个去重后的批次，返回按唯一文本排列的结果
    ///
    /// `None` 表示该条没有可用译文。
    async fn fetch(&self, batch: &Batch, language: Language) -> Vec<Option<String>> {
        let unique = batch.unique();
        let stats = &self.inner.stats;

        stats.remote_requests.fetch_add(1, Ordering::Relaxed);
        stats.texts_sent.fetch_add(unique.len(), Ordering::Relaxed);

        tracing::debug!(
            "发送翻译批次: {} 条唯一文本 (去重 {} 条), 目标语言 {}",
            unique.len(),
            batch.duplicates(),
            language
        );

        let translations = match self
            .inner
            .backend
            .translate(unique, &self.inner.source_lang, language)
            .await
        {
            Ok(translations) => translations,
            Err(e) => {
                stats.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    "远程翻译失败，保留原文 ({} 条, 后端 {}): {}",
                    unique.len(),
                    self.inner.backend.name(),
                    e
                );
                return vec![None; unique.len()];
            }
        };

        if translations.len() < unique.len() {
            tracing::warn!(
                "翻译结果数量不足: 期望 {}, 实际 {}",
                unique.len(),
                translations.len()
            );
        }

        unique
            .iter()
            .enumerate()
            .map(|(slot, source)| {
                let translated = translations.get(slot).filter(|t| !t.is_empty())?;
                self.inner
                    .cache
                    .insert(TranslationEntry::new(source.as_str(), language, translated.as_str()));
                Some(translated.clone())
            })
            .collect()
    }

    /// 翻译单条文本
    ///
    /// 同一 `(文本, 语言)` 的请求进行中时，后来的调用等待同一个请求的结果。
    pub async fn translate(&self, text: &str, language: Language) -> String {
        if language.is_noop() || text.trim().is_empty() {
            return text.to_string();
        }

        if let Some(hit) = self.inner.cache.get(text, language) {
            self.inner.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return hit;
        }

        let key = CacheKey::new(text, language);
        let future = match self.inner.pending.entry(key.clone()) {
            Entry::Occupied(entry) => {
                self.inner.stats.coalesced.fetch_add(1, Ordering::Relaxed);
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let this = self.clone();
                let text = text.to_string();
                let future = async move {
                    let batch = Batch::plan([text.as_str()]);
                    let translated = this.fetch(&batch, language).await;
                    translated.into_iter().next().flatten().unwrap_or(text)
                }
                .boxed()
                .shared();
                entry.insert(future.clone());
                future
            }
        };

        let mut guard = PendingGuard {
            pending: &self.inner.pending,
            key,
            future,
        };
        (&mut guard.future).await
    }

    /// 进行中的单条请求数
    pub fn pending_requests(&self) -> usize {
        self.inner.pending.len()
    }
}
