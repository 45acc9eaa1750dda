//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `HIVE__*` 覆盖（双下划线表示嵌套，如 `HIVE__REASONER__PROVIDER=openai`）。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::core::RetryPolicy;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub orchestration: OrchestrationSection,
    pub tools: ToolsSection,
    pub reasoner: ReasonerSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "hive".to_string(),
        }
    }
}

/// [orchestration] 段：并行拓扑的整体运行超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestrationSection {
    pub run_timeout_secs: u64,
}

impl Default for OrchestrationSection {
    fn default() -> Self {
        Self {
            run_timeout_secs: 90,
        }
    }
}

impl OrchestrationSection {
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs.max(1))
    }
}

/// [tools] 段：单次调用超时、重试、各数据源
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    pub tool_timeout_secs: u64,
    pub retry: RetrySection,
    pub weather: WeatherSection,
    pub news: NewsSection,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: 15,
            retry: RetrySection::default(),
            weather: WeatherSection::default(),
            news: NewsSection::default(),
        }
    }
}

/// [tools.retry] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 250,
            max_delay_ms: 4000,
        }
    }
}

impl RetrySection {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

/// [tools.weather] 段：Open-Meteo 端点与预报天数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherSection {
    pub geocode_url: String,
    pub forecast_url: String,
    pub forecast_days: u8,
}

impl Default for WeatherSection {
    fn default() -> Self {
        Self {
            geocode_url: crate::tools::weather::DEFAULT_GEOCODE_URL.to_string(),
            forecast_url: crate::tools::weather::DEFAULT_FORECAST_URL.to_string(),
            forecast_days: 5,
        }
    }
}

/// [tools.news] 段：Google News RSS 端点、条数与语言
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsSection {
    pub endpoint: String,
    pub max_items: usize,
    pub language: String,
}

impl Default for NewsSection {
    fn default() -> Self {
        Self {
            endpoint: crate::tools::news::DEFAULT_NEWS_URL.to_string(),
            max_items: 4,
            language: "en-US".to_string(),
        }
    }
}

/// [reasoner] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReasonerSection {
    /// template / openai；openai 需同时设置 OPENAI_API_KEY
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ReasonerSection {
    fn default() -> Self {
        Self {
            provider: "template".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            request_timeout_secs: 60,
        }
    }
}

impl ReasonerSection {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// 从 config 目录加载配置，环境变量 HIVE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 HIVE__*（双下划线表示嵌套键）
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
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("HIVE")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
