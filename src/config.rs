//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `TERN__*` 覆盖（双下划线表示嵌套，
//! 如 `TERN__LLM__PROVIDER=openai`、`TERN__MEMORY__ENABLED=false`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub memory: MemorySection,
    #[serde(default)]
    pub tools: ToolsSection,
}

/// [app] 段：应用名与默认用户
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
    /// REPL 会话归属的用户标识（长期记忆元数据用）
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_user_id() -> String {
    "traveler".to_string()
}

/// [llm] 段：后端选择
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmSection {
    /// 后端：deepseek / openai；优先级由 API Key 与 provider 共同决定
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    #[serde(default)]
    pub deepseek: LlmDeepSeekSection,
    #[serde(default)]
    pub openai: LlmOpenAiSection,
}

fn default_provider() -> String {
    "deepseek".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmDeepSeekSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmOpenAiSection {
    pub model: Option<String>,
}

/// [memory] 段：长期记忆的开关、检索条数与快照路径
#[derive(Debug, Clone, Deserialize)]
pub struct MemorySection {
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,
    /// 每回合检索的过往片段条数
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// JSON 快照文件；未设置时记忆只驻留内存
    pub snapshot_path: Option<PathBuf>,
}

fn default_memory_enabled() -> bool {
    true
}

fn default_top_k() -> usize {
    3
}

fn default_max_entries() -> usize {
    1000
}

impl Default for MemorySection {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            top_k: default_top_k(),
            max_entries: default_max_entries(),
            snapshot_path: None,
        }
    }
}

/// [tools] 段：工具超时
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    /// 天气请求的 HTTP 超时（秒），需小于工具超时
    #[serde(default = "default_weather_timeout_secs")]
    pub weather_timeout_secs: u64,
}

fn default_tool_timeout_secs() -> u64 {
    30
}

fn default_weather_timeout_secs() -> u64 {
    15
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
            weather_timeout_secs: default_weather_timeout_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            llm: LlmSection::default(),
            memory: MemorySection::default(),
            tools: ToolsSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 TERN__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 TERN__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("TERN")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
