//! 翻译系统核心模块
//!
//! - **client** (`client.rs`): 远程翻译后端与带缓存的远程翻译器
//! - **context** (`context.rs`): 逐条翻译界面文本的上下文
//! - **service** (`service.rs`): 对整个DOM执行翻译流程
//!
//! ```text
//! AutoTranslator (service.rs)
//!     ├── TextNodeWalker (pipeline/walker.rs)
//!     ├── Dictionary (dictionary.rs)
//!     └── RemoteTranslator (client.rs)
//!             ├── Batch (pipeline/batch.rs)
//!             ├── TranslationCache (storage/cache.rs)
//!             └── TranslationBackend
//! ```

pub mod client;
pub mod context;
pub mod service;

pub use client::{GoogleTranslateBackend, RemoteTranslator, TranslationBackend, TranslatorStats};
pub use context::TranslationContext;
pub use service::{AutoTranslator, PassOutcome, PassReport, SkipReason};
