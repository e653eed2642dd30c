// 集成测试公共模块
//
// 提供测试辅助工具和共享功能

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use markup5ever_rcdom::RcDom;

use autotranslate::parsers::html::{html_to_dom, serialize_document};
use autotranslate::translation::{
    AutoTranslator, Dictionary, Language, RemoteTranslator, TranslationBackend, TranslationCache,
    TranslationError, TranslationResult,
};

/// 模拟翻译后端
///
/// 译文格式为 `{lang}:{text}`，记录每次请求发送的文本。
#[derive(Debug, Default)]
pub struct MockBackend {
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<String>>>,
    failing: AtomicBool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let backend = Self::default();
        backend.set_failing(true);
        backend
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }

    /// 所有请求发送过的文本（按顺序展开）
    pub fn sent_texts(&self) -> Vec<String> {
        self.requests().into_iter().flatten().collect()
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    async fn translate(
        &self,
        texts: &[String],
        _source: &str,
        target: Language,
    ) -> TranslationResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(texts.to_vec());
        // 模拟网络往返，让并发的流程有机会交错执行
        tokio::task::yield_now().await;

        if self.failing.load(Ordering::SeqCst) {
            return Err(TranslationError::NetworkError("simulated network error".to_string()));
        }

        Ok(texts.iter().map(|t| format!("{}:{}", target.code(), t)).collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// 测试环境
pub struct TestEnvironment {
    pub backend: Arc<MockBackend>,
    pub cache: Arc<TranslationCache>,
    pub translator: RemoteTranslator,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self::with_backend(MockBackend::new())
    }

    pub fn with_backend(backend: MockBackend) -> Self {
        let backend = Arc::new(backend);
        let cache = Arc::new(TranslationCache::new());
        let translator = RemoteTranslator::new(backend.clone(), Arc::clone(&cache));
        Self {
            backend,
            cache,
            translator,
        }
    }

    /// 使用内置词典、无等待时间的自动翻译器
    pub fn auto(&self, language: Language) -> AutoTranslator {
        self.auto_with(language, Dictionary::builtin())
    }

    pub fn auto_with(&self, language: Language, dictionary: Dictionary) -> AutoTranslator {
        AutoTranslator::new(language, Arc::new(dictionary), self.translator.clone())
            .with_settle_delay(Duration::ZERO)
    }
}

/// HTML测试辅助工具
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    pub fn parse(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8").expect("test HTML should parse")
    }

    pub fn to_html(dom: &RcDom) -> String {
        String::from_utf8(serialize_document(dom, "").expect("serialize")).expect("utf-8 output")
    }

    /// 一个典型的后台管理页面
    pub fn dashboard_page() -> String {
        r#"<html>
<head><title>Dashboard</title><style>.x { color: red; }</style></head>
<body>
  <nav><a href="/">Dashboard</a> <a href="/settings">Settings</a></nav>
  <main>
    <h1>  Conversations  </h1>
    <p>You have new messages</p>
    <p>You have new messages</p>
    <code>GET /api/v1/conversations</code>
    <pre>  preformatted  </pre>
    <div data-no-translate><span>AcmeBot</span></div>
    <textarea>draft reply</textarea>
    <div contenteditable="true">Editable note</div>
    <button>Save</button>
  </main>
  <script>console.log("Hello");</script>
</body>
</html>"#
            .to_string()
    }
}
