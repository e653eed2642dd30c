//! 自动翻译服务
//!
//! 一次翻译流程：遍历文本节点 -> 词典解析 -> 剩余文本交给远程翻译器
//! 批量翻译 -> 写回节点（保留首尾空白）。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::{Duration, Instant};

use markup5ever_rcdom::{Handle, Node, RcDom};

use crate::translation::config::constants;
use crate::translation::core::client::RemoteTranslator;
use crate::translation::core::context::TranslationContext;
use crate::translation::dictionary::Dictionary;
use crate::translation::language::Language;
use crate::translation::pipeline::{apply_translation, Batch, TextNodeCandidate, TextNodeWalker};

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 目标语言为英语
    NoopLanguage,
    /// 已有翻译流程在进行
    InProgress,
}

/// 翻译流程结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Completed,
    Skipped(SkipReason),
}

/// 翻译流程报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// 收集到的候选文本节点
    pub candidates: usize,
    /// 词典命中
    pub dictionary_hits: usize,
    /// 交给远程翻译器的唯一文本数
    pub remote_sent: usize,
    /// 实际改写的节点数
    pub applied: usize,
    pub outcome: PassOutcome,
}

impl PassReport {
    fn completed() -> Self {
        Self {
            candidates: 0,
            dictionary_hits: 0,
            remote_sent: 0,
            applied: 0,
            outcome: PassOutcome::Completed,
        }
    }

    fn skipped(reason: SkipReason) -> Self {
        Self {
            outcome: PassOutcome::Skipped(reason),
            ..Self::completed()
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, PassOutcome::Skipped(_))
    }
}

/// 流程结束（包括提前返回）时清除进行中标记
struct PassGuard<'a>(&'a Cell<bool>);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// 自动翻译器
///
/// 绑定一种目标语言。DOM 为单线程结构，翻译器同样只在单线程中使用；
/// 同一翻译器上的流程不会重入，不同翻译器之间不做协调。
pub struct AutoTranslator {
    language: Language,
    dictionary: Arc<Dictionary>,
    translator: RemoteTranslator,
    settle_delay: Duration,
    in_progress: Cell<bool>,
    /// 本会话中已翻译的节点，以节点地址为键
    ///
    /// 弱引用保持分配存活，地址在条目被清理前不会复用。
    translated: RefCell<HashMap<*const Node, Weak<Node>>>,
}

impl AutoTranslator {
    pub fn new(language: Language, dictionary: Arc<Dictionary>, translator: RemoteTranslator) -> Self {
        Self {
            language,
            dictionary,
            translator,
            settle_delay: constants::DEFAULT_SETTLE_DELAY,
            in_progress: Cell::new(false),
            translated: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn translator(&self) -> &RemoteTranslator {
        &self.translator
    }

    /// 与本翻译器共享词典和缓存的上下文
    pub fn context(&self) -> TranslationContext {
        TranslationContext::new(self.language, Arc::clone(&self.dictionary), self.translator.clone())
    }

    /// 节点是否已在本会话中翻译过
    pub fn is_translated(&self, node: &Handle) -> bool {
        self.translated
            .borrow()
            .get(&Rc::as_ptr(node))
            .map_or(false, |weak| weak.strong_count() > 0)
    }

    /// 仍存活的已翻译节点数
    pub fn translated_count(&self) -> usize {
        self.translated
            .borrow()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn is_running(&self) -> bool {
        self.in_progress.get()
    }

    /// 等待 DOM 稳定后执行翻译流程
    pub async fn schedule_pass(&self, dom: &RcDom) -> PassReport {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        self.run_pass(dom).await
    }

    /// 执行一次翻译流程
    pub async fn run_pass(&self, dom: &RcDom) -> PassReport {
        if self.language.is_noop() {
            tracing::debug!("目标语言为英语，跳过翻译");
            return PassReport::skipped(SkipReason::NoopLanguage);
        }

        if self.in_progress.replace(true) {
            tracing::debug!("翻译流程进行中，跳过");
            return PassReport::skipped(SkipReason::InProgress);
        }
        let _guard = PassGuard(&self.in_progress);

        let start_time = Instant::now();
        self.translated.borrow_mut().retain(|_, weak| weak.strong_count() > 0);

        let candidates: Vec<TextNodeCandidate> = TextNodeWalker::new(dom)
            .with_skip(|node| self.is_translated(node))
            .collect();

        let mut report = PassReport::completed();
        report.candidates = candidates.len();

        if candidates.is_empty() {
            tracing::info!("未发现需要翻译的新文本节点");
            return report;
        }

        tracing::info!("发现 {} 个待翻译文本节点 (目标语言 {})", candidates.len(), self.language);

        // 词典优先
        let mut translations: Vec<Option<String>> = vec![None; candidates.len()];
        let mut remote_positions = Vec::new();
        for (i, candidate) in candidates.iter().enumerate() {
            match self.dictionary.get(&candidate.original, self.language) {
                Some(hit) => {
                    translations[i] = Some(hit.to_string());
                    report.dictionary_hits += 1;
                }
                None => remote_positions.push(i),
            }
        }

        if !remote_positions.is_empty() {
            let remote_texts: Vec<String> = remote_positions
                .iter()
                .map(|&i| candidates[i].original.clone())
                .collect();
            report.remote_sent = Batch::plan(&remote_texts).unique().len();

            let translated = self.translator.translate_batch(&remote_texts, self.language).await;
            for (&i, text) in remote_positions.iter().zip(translated) {
                translations[i] = Some(text);
            }
        }

        // 写回
        let mut translated_nodes = self.translated.borrow_mut();
        for (candidate, translation) in candidates.iter().zip(translations) {
            let Some(translation) = translation else { continue };
            if apply_translation(&candidate.node, &translation) {
                translated_nodes.insert(Rc::as_ptr(&candidate.node), Rc::downgrade(&candidate.node));
                report.applied += 1;
            }
        }

        tracing::info!(
            "翻译完成: 候选 {}, 词典命中 {}, 远程 {}, 已应用 {}, 耗时 {:?}",
            report.candidates,
            report.dictionary_hits,
            report.remote_sent,
            report.applied,
            start_time.elapsed()
        );

        report
    }
}
