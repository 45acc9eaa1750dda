//! 装配：由配置构建工具注册表、推理后端、两条流水线与根分发器
//!
//! create_dispatcher_with 接收工具注册表与推理后端，CLI 与测试分别注入真实实现或替身。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::HiveError;
use crate::dispatcher::RootDispatcher;
use crate::llm::{OpenAiReasoner, Reasoner, TemplateReasoner};
use crate::specialists::{
    BudgetPlanner, CreativeKind, CreativeSpecialist, LocalNewsSafety, SafetyWatch, Specialist,
    Toolkit, TripPlanner, WeatherIntel,
};
use crate::tools::{GoogleNewsTool, OpenMeteoTool, ToolExecutor, ToolRegistry};
use crate::workflow::PipelineBuilder;

/// 注册 Open-Meteo 天气与 Google News RSS 两个工具
pub fn create_tool_registry(cfg: &AppConfig) -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(OpenMeteoTool::new(
        cfg.tools.weather.geocode_url.clone(),
        cfg.tools.weather.forecast_url.clone(),
    ));
    tools.register(GoogleNewsTool::new(cfg.tools.news.endpoint.clone()));
    tools
}

/// provider = "openai" 且存在 OPENAI_API_KEY 时使用 OpenAI 兼容后端，否则使用模板后端
pub fn create_reasoner_from_config(cfg: &AppConfig) -> Arc<dyn Reasoner> {
    if cfg.reasoner.provider.eq_ignore_ascii_case("openai") {
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => {
                tracing::info!(model = %cfg.reasoner.model, "using OpenAI-compatible reasoner");
                return Arc::new(OpenAiReasoner::new(
                    cfg.reasoner.base_url.as_deref(),
                    &cfg.reasoner.model,
                    key.trim(),
                ));
            }
            _ => tracing::warn!("OPENAI_API_KEY not set, falling back to template reasoner"),
        }
    }
    Arc::new(TemplateReasoner::new())
}

pub fn build_toolkit(cfg: &AppConfig, registry: ToolRegistry, reasoner: Arc<dyn Reasoner>) -> Toolkit {
    let executor = Arc::new(ToolExecutor::new(registry, cfg.tools.tool_timeout_secs));
    Toolkit::new(executor, reasoner)
        .with_retry(cfg.tools.retry.policy())
        .with_reasoning_timeout(cfg.reasoner.request_timeout())
}

/// 规划流水线，按依赖顺序排列
pub fn planning_stages(cfg: &AppConfig, toolkit: &Toolkit) -> Vec<Arc<dyn Specialist>> {
    vec![
        Arc::new(WeatherIntel::new(toolkit.clone(), cfg.tools.weather.forecast_days)) as Arc<dyn Specialist>,
        Arc::new(LocalNewsSafety::new(
            toolkit.clone(),
            cfg.tools.news.max_items,
            cfg.tools.news.language.clone(),
        )) as Arc<dyn Specialist>,
        Arc::new(SafetyWatch::new()) as Arc<dyn Specialist>,
        Arc::new(TripPlanner::new(toolkit.clone())) as Arc<dyn Specialist>,
    ]
}

/// 创意阶段集合，彼此独立
pub fn creative_stages(toolkit: &Toolkit) -> Vec<Arc<dyn Specialist>> {
    vec![
        Arc::new(CreativeSpecialist::new(CreativeKind::Theme, toolkit.clone())) as Arc<dyn Specialist>,
        Arc::new(CreativeSpecialist::new(CreativeKind::Menu, toolkit.clone())) as Arc<dyn Specialist>,
        Arc::new(CreativeSpecialist::new(CreativeKind::Activity, toolkit.clone())) as Arc<dyn Specialist>,
        Arc::new(BudgetPlanner::new(toolkit.clone())) as Arc<dyn Specialist>,
    ]
}

/// 运行前拒绝无法工作的数值配置
pub fn validate_config(cfg: &AppConfig) -> Result<(), HiveError> {
    if !(1..=7).contains(&cfg.tools.weather.forecast_days) {
        return Err(HiveError::Config(format!(
            "tools.weather.forecast_days must be within 1..=7, got {}",
            cfg.tools.weather.forecast_days
        )));
    }
    if cfg.tools.news.max_items == 0 {
        return Err(HiveError::Config("tools.news.max_items must be positive".to_string()));
    }
    if cfg.tools.retry.max_attempts == 0 {
        return Err(HiveError::Config("tools.retry.max_attempts must be positive".to_string()));
    }
    Ok(())
}

pub fn create_dispatcher_with(
    cfg: &AppConfig,
    registry: ToolRegistry,
    reasoner: Arc<dyn Reasoner>,
) -> Result<RootDispatcher, HiveError> {
    validate_config(cfg)?;
    let toolkit = build_toolkit(cfg, registry, reasoner);

    let planning = planning_stages(cfg, &toolkit)
        .into_iter()
        .fold(PipelineBuilder::new("planning").tools(toolkit.registry()), |b, s| b.stage_arc(s))
        .build_sequential()?;
    let creative = creative_stages(&toolkit)
        .into_iter()
        .fold(PipelineBuilder::new("creative").tools(toolkit.registry()), |b, s| b.stage_arc(s))
        .build_parallel(cfg.orchestration.run_timeout())?;

    tracing::debug!(
        reasoner = toolkit.reasoner_name(),
        tools = ?toolkit.registry().tool_descriptions(),
        "dispatcher assembled"
    );
    Ok(RootDispatcher::new(planning, creative))
}
