//! 命令行入口

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use autotranslate::core::{print_error_message, print_info_message, translate_document, TranslationSession};
use autotranslate::env::{self, EnvVar};
use autotranslate::translation::{
    ConfigManager, FilePreferenceStore, Language, LanguageState, PreferenceStore, TranslationCache,
    TranslationConfig, TranslationError, TranslationResult,
};

#[derive(Parser, Debug)]
#[command(name = "autotranslate", version, about = "自动翻译HTML页面中的可见文本")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// 输入HTML文件，省略时读取标准输入
    input: Option<PathBuf>,

    /// 本次使用的目标语言 (en, es, it, tr, ar)，不写入偏好
    #[arg(short, long)]
    language: Option<Language>,

    /// 输出文件，默认写到标准输出
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 输入文档的字符集
    #[arg(short, long, default_value = "utf-8")]
    encoding: String,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 查看或选择界面语言（选择会被持久化）
    Language {
        code: Option<Language>,
    },
    /// 管理持久化的翻译缓存
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// 生成示例配置文件
    InitConfig {
        file: PathBuf,
    },
    /// 列出支持的环境变量
    EnvDocs,
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// 删除缓存快照
    Clear,
    /// 显示缓存快照统计
    Stats,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        print_error_message(&e.to_string());
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        env::core::LogLevel::get()
            .ok()
            .and_then(|level| level.parse().ok())
            .unwrap_or(tracing::Level::INFO)
    };
    let ansi = atty::is(atty::Stream::Stderr) && !env::core::NoColor::get_or_default(false);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> TranslationResult<()> {
    match cli.command {
        Some(Command::InitConfig { file }) => {
            ConfigManager::generate_example_config(&file)?;
            print_info_message(&format!("示例配置已写入 {}", file.display()));
            return Ok(());
        }
        Some(Command::EnvDocs) => {
            print_info_message(&env::generate_env_docs());
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Command::Language { code }) => select_language(&config, code),
        Some(Command::Cache { action }) => manage_cache(&config, action),
        _ => {
            translate_input(
                config,
                cli.input.as_deref(),
                cli.output.as_deref(),
                &cli.encoding,
                cli.language,
            )
            .await
        }
    }
}

fn load_config(path: Option<&Path>) -> TranslationResult<TranslationConfig> {
    let manager = match path {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };
    let mut config = manager.into_config();

    if config.state_dir.is_none() {
        config.state_dir = ProjectDirs::from("", "", "autotranslate").map(|dirs| dirs.data_dir().to_path_buf());
    }

    Ok(config)
}

fn preference_store(config: &TranslationConfig) -> TranslationResult<FilePreferenceStore> {
    config
        .preferences_path()
        .map(FilePreferenceStore::new)
        .ok_or_else(|| TranslationError::ConfigError("无法确定状态目录，请设置 state_dir".to_string()))
}

/// 一次性覆盖 > 环境变量/配置 > 已保存的偏好 > 英语
fn resolve_language(config: &TranslationConfig, one_off: Option<Language>) -> Language {
    if let Some(language) = one_off.or(config.language_override) {
        return language;
    }

    match preference_store(config) {
        Ok(store) => LanguageState::load(store, Box::new(|_: Language| {})).current(),
        Err(_) => Language::default(),
    }
}

fn select_language(config: &TranslationConfig, code: Option<Language>) -> TranslationResult<()> {
    let store = preference_store(config)?;
    let mut state = LanguageState::load(
        store,
        Box::new(|language: Language| {
            print_info_message(&format!(
                "界面语言已设置为 {} ({})，下次运行时生效",
                language.native_name(),
                language.code()
            ));
        }),
    );

    match code {
        Some(language) => state.select(language),
        None => {
            let current = state.current();
            for language in Language::ALL {
                let marker = if language == current { "*" } else { " " };
                print_info_message(&format!("{} {:<3} {}", marker, language.code(), language.native_name()));
            }
            if state.store().get(autotranslate::translation::language::LANGUAGE_KEY).is_none() {
                print_info_message("(尚未保存语言偏好)");
            }
            Ok(())
        }
    }
}

fn manage_cache(config: &TranslationConfig, action: CacheAction) -> TranslationResult<()> {
    let path = config
        .resolved_cache_path()
        .ok_or_else(|| TranslationError::ConfigError("未配置缓存路径".to_string()))?;

    match action {
        CacheAction::Clear => {
            if path.exists() {
                fs::remove_file(&path)?;
                print_info_message(&format!("已删除缓存快照 {}", path.display()));
            } else {
                print_info_message("缓存快照不存在");
            }
        }
        CacheAction::Stats => {
            let cache = TranslationCache::new();
            let loaded = cache.load_snapshot(&path)?;
            print_info_message(&format!("快照: {}", path.display()));
            print_info_message(&format!("原文: {}", cache.source_count()));
            print_info_message(&format!("译文: {}", loaded));
            for language in Language::ALL.iter().filter(|l| !l.is_noop()) {
                let count = cache.count_for(*language);
                if count > 0 {
                    print_info_message(&format!("  {}: {}", language.code(), count));
                }
            }
        }
    }

    Ok(())
}

async fn translate_input(
    config: TranslationConfig,
    input: Option<&Path>,
    output: Option<&Path>,
    encoding: &str,
    one_off: Option<Language>,
) -> TranslationResult<()> {
    let language = resolve_language(&config, one_off);

    let data = match input {
        Some(path) => fs::read(path)
            .map_err(|e| TranslationError::StorageError(format!("读取输入失败: {}", e)).with_context(path.display()))?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let session = TranslationSession::from_config(config)?;
    let auto = session.auto_translator(language);
    let document = translate_document(&data, encoding, &auto).await?;

    match output {
        Some(path) => fs::write(path, &document.data)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&document.data)?;
            stdout.flush()?;
        }
    }

    if let Err(e) = session.save_cache() {
        tracing::warn!("保存缓存快照失败: {}", e);
    }

    let stats = session.translator().stats();
    tracing::info!(
        "语言 {}: 应用 {} 处翻译, 远程请求 {} 次 (失败 {})",
        language,
        document.report.applied,
        stats.remote_requests(),
        stats.failures()
    );

    Ok(())
}
