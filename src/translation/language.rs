//! 语言状态模块
//!
//! 当前语言是一个全局选择，持久化到偏好存储。切换语言只有一条路径：
//! 先写入存储，再触发整页重载，不存在就地重新渲染。

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};

/// 偏好存储中保存语言选择的键
pub const LANGUAGE_KEY: &str = "language";

/// 支持的界面语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    It,
    Tr,
    Ar,
}

impl Language {
    /// 全部语言，按菜单顺序
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::Es,
        Language::It,
        Language::Tr,
        Language::Ar,
    ];

    /// ISO 639-1 代码
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::It => "it",
            Language::Tr => "tr",
            Language::Ar => "ar",
        }
    }

    /// 语言的本地名称
    pub fn native_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Español",
            Language::It => "Italiano",
            Language::Tr => "Türkçe",
            Language::Ar => "العربية",
        }
    }

    /// 英语是源语言，选择英语不做任何翻译
    pub fn is_noop(self) -> bool {
        self == Language::En
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| {
                TranslationError::InvalidInput(format!(
                    "不支持的语言 '{}'，可选: en, es, it, tr, ar",
                    s
                ))
            })
    }
}

/// 键值偏好存储
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> TranslationResult<()>;
}

/// 内存中的偏好存储
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> TranslationResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| TranslationError::StorageError(format!("偏好存储锁已损坏: {}", e)))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 以JSON文件保存的偏好存储
///
/// 每次写入都会重写整个文件；读取失败一律视为"未设置"。
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> HashMap<String, String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("偏好文件 {} 无法解析，忽略: {}", self.path.display(), e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> TranslationResult<()> {
        let mut values = self.read_all();
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&values)?;
        fs::write(&self.path, content)
            .map_err(|e| TranslationError::StorageError(format!("写入偏好文件失败: {}", e)))
    }
}

/// 重载回调，接收新选中的语言
pub type ReloadHook = Box<dyn Fn(Language)>;

/// 全局语言状态
///
/// 状态即五种语言之一。初始状态来自存储中最后一次持久化的值，
/// 缺失或无法识别时为英语。
pub struct LanguageState<S: PreferenceStore> {
    current: Language,
    store: S,
    on_reload: ReloadHook,
}

impl<S: PreferenceStore> LanguageState<S> {
    /// 从存储加载初始语言
    pub fn load(store: S, on_reload: ReloadHook) -> Self {
        let current = store
            .get(LANGUAGE_KEY)
            .and_then(|saved| match saved.parse::<Language>() {
                Ok(lang) => Some(lang),
                Err(e) => {
                    tracing::warn!("忽略已保存的语言: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        Self {
            current,
            store,
            on_reload,
        }
    }

    pub fn current(&self) -> Language {
        self.current
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 选择语言：持久化后强制重载
    ///
    /// 即使选择的是当前语言也会重载。持久化失败时不会触发重载。
    pub fn select(&mut self, language: Language) -> TranslationResult<()> {
        self.store.set(LANGUAGE_KEY, language.code())?;
        tracing::info!("语言切换: {} -> {}，重新加载页面", self.current, language);
        self.current = language;
        (self.on_reload)(language);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_hook() -> (ReloadHook, Rc<RefCell<Vec<Language>>>) {
        let reloads = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reloads);
        (Box::new(move |lang| sink.borrow_mut().push(lang)), reloads)
    }

    #[test]
    fn test_language_codes_round_trip() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }
        assert_eq!(" ES ".parse::<Language>().unwrap(), Language::Es);
        assert!("fr".parse::<Language>().is_err());
        assert!(Language::En.is_noop());
        assert!(!Language::Ar.is_noop());
    }

    #[test]
    fn test_initial_state_defaults_to_english() {
        let (hook, _) = recording_hook();
        let state = LanguageState::load(MemoryPreferenceStore::new(), hook);
        assert_eq!(state.current(), Language::En);
    }

    #[test]
    fn test_initial_state_ignores_unknown_value() {
        let store = MemoryPreferenceStore::new();
        store.set(LANGUAGE_KEY, "klingon").unwrap();
        let (hook, _) = recording_hook();
        let state = LanguageState::load(store, hook);
        assert_eq!(state.current(), Language::En);
    }

    #[test]
    fn test_select_persists_then_reloads() {
        let (hook, reloads) = recording_hook();
        let mut state = LanguageState::load(MemoryPreferenceStore::new(), hook);

        state.select(Language::Tr).unwrap();
        assert_eq!(state.current(), Language::Tr);
        assert_eq!(state.store().get(LANGUAGE_KEY).as_deref(), Some("tr"));

        // 选择同一语言仍然重载
        state.select(Language::Tr).unwrap();
        assert_eq!(*reloads.borrow(), vec![Language::Tr, Language::Tr]);
    }

    #[test]
    fn test_file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("preferences.json");

        let (hook, _) = recording_hook();
        let mut state = LanguageState::load(FilePreferenceStore::new(&path), hook);
        state.select(Language::It).unwrap();

        let (hook, _) = recording_hook();
        let reloaded = LanguageState::load(FilePreferenceStore::new(&path), hook);
        assert_eq!(reloaded.current(), Language::It);
    }

    #[test]
    fn test_file_store_treats_corrupt_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{not json").unwrap();

        let store = FilePreferenceStore::new(&path);
        assert_eq!(store.get(LANGUAGE_KEY), None);
        store.set(LANGUAGE_KEY, "ar").unwrap();
        assert_eq!(store.get(LANGUAGE_KEY).as_deref(), Some("ar"));
    }
}
