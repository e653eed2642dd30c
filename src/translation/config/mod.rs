//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 远程翻译API
    pub const DEFAULT_API_URL: &str = "https://translation.googleapis.com/language/translate/v2";
    pub const DEFAULT_SOURCE_LANG: &str = "en";

    // 语言切换后等待DOM稳定的时间
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
    pub const MAX_SETTLE_DELAY: Duration = Duration::from_secs(10);

    // 缓存快照
    pub const CACHE_SNAPSHOT_VERSION: u32 = 2;
    pub const MAX_PERSISTED_SOURCES: usize = 1000;
    pub const CACHE_FILE_NAME: &str = "translation-cache-v2.json";
    pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

    // 跳过的元素：脚本、样式、代码块和原始文本容器
    pub const SKIP_ELEMENTS: &[&str] = &[
        "script", "style", "code", "pre", "noscript", "iframe", "xmp", "noembed", "noframes",
    ];

    // 可编辑区域
    pub const EDITABLE_ELEMENTS: &[&str] = &["textarea"];

    // 显式退出翻译的属性
    pub const OPT_OUT_ATTR: &str = "data-no-translate";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "autotranslate.toml",
        ".autotranslate.toml",
        "~/.config/autotranslate/config.toml",
        "/etc/autotranslate/config.toml",
    ];
}
