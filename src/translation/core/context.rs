//! 翻译上下文
//!
//! 当前语言、词典与远程翻译器的显式组合，供需要逐条翻译界面文本的调用方使用。

use std::sync::Arc;

use crate::translation::core::client::RemoteTranslator;
use crate::translation::dictionary::Dictionary;
use crate::translation::language::Language;

#[derive(Debug, Clone)]
pub struct TranslationContext {
    language: Language,
    dictionary: Arc<Dictionary>,
    translator: RemoteTranslator,
}

impl TranslationContext {
    pub fn new(language: Language, dictionary: Arc<Dictionary>, translator: RemoteTranslator) -> Self {
        Self {
            language,
            dictionary,
            translator,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn translator(&self) -> &RemoteTranslator {
        &self.translator
    }

    /// 同步翻译
    ///
    /// 词典或缓存命中时返回译文，否则返回原文；处于 Tokio 运行时中时，
    /// 在后台预取译文供下次使用。
    pub fn t(&self, text: &str) -> String {
        if text.is_empty() || self.language.is_noop() {
            return text.to_string();
        }

        if let Some(hit) = self.dictionary.get(text, self.language) {
            return hit.to_string();
        }

        if let Some(hit) = self.translator.cache().get(text, self.language) {
            return hit;
        }

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let translator = self.translator.clone();
            let language = self.language;
            let text = text.to_string();
            handle.spawn(async move {
                translator.translate(&text, language).await;
            });
        }

        text.to_string()
    }

    /// 异步翻译：词典优先，其次远程翻译
    pub async fn translate_async(&self, text: &str) -> String {
        if text.is_empty() || self.language.is_noop() {
            return text.to_string();
        }

        if let Some(hit) = self.dictionary.get(text, self.language) {
            return hit.to_string();
        }

        self.translator.translate(text, self.language).await
    }
}
