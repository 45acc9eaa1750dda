//! 专家层：每个阶段一个 Specialist，消费 SharedContext，恰好产出一个 Artifact
//!
//! - **weather**: 天气情报（Open-Meteo）
//! - **news**: 本地新闻安全分级
//! - **advisory**: 官方提示与出行要求
//! - **itinerary**: 行程规划（出发前 / 行程中 / 返程后）
//! - **creative**: 主题 / 菜单 / 活动创意
//! - **budget**: 预算拆分
//!
//! 工具与推理调用统一经由 Toolkit：超时 + 有界重试；专家自身从不 panic 或向上返回错误。

pub mod advisory;
pub mod budget;
pub mod catalog;
pub mod creative;
pub mod itinerary;
pub mod news;
pub mod risk;
pub mod weather;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::{Artifact, ArtifactFamily, RetryPolicy, SharedContext, StageId, StageInfo, ToolFailure};
use crate::llm::{Prompt, Reasoner};
use crate::tools::{ToolExecutor, ToolQuery, ToolRegistry, ToolResponse};

pub use advisory::SafetyWatch;
pub use budget::BudgetPlanner;
pub use creative::{CreativeKind, CreativeSpecialist};
pub use itinerary::TripPlanner;
pub use news::LocalNewsSafety;
pub use weather::WeatherIntel;

/// 阶段标识
pub mod stage {
    pub const WEATHER_INTEL: &str = "weather_intel";
    pub const LOCAL_NEWS_SAFETY: &str = "local_news_safety";
    pub const SAFETY_WATCH: &str = "safety_watch";
    pub const TRIP_PLANNER: &str = "trip_planner";
    pub const THEME_DESIGNER: &str = "theme_designer";
    pub const MENU_MIXOLOGIST: &str = "menu_mixologist";
    pub const ACTIVITY_ARCHITECT: &str = "activity_architect";
    pub const BUDGET_PLANNER: &str = "budget_planner";
}

/// 工具注册名
pub mod tool {
    pub const WEATHER: &str = "weather";
    pub const NEWS: &str = "news";
}

#[async_trait]
pub trait Specialist: Send + Sync {
    fn info(&self) -> &StageInfo;

    fn id(&self) -> &StageId {
        &self.info().id
    }

    fn family(&self) -> ArtifactFamily {
        self.info().family
    }

    /// 必须先于本阶段产出 Artifact 的阶段
    fn depends_on(&self) -> Vec<StageId> {
        Vec::new()
    }

    /// 本阶段会调用的工具名，构建期校验是否已注册
    fn required_tools(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// 恰好产出一个 Artifact（可能为 Failed）
    async fn run(&self, ctx: &SharedContext) -> Artifact;
}

/// 专家共享的调用能力：工具执行器 + 推理后端 + 重试策略
#[derive(Clone)]
pub struct Toolkit {
    tools: Arc<ToolExecutor>,
    reasoner: Arc<dyn Reasoner>,
    retry: RetryPolicy,
    reasoning_timeout: Duration,
}

impl Toolkit {
    pub fn new(tools: Arc<ToolExecutor>, reasoner: Arc<dyn Reasoner>) -> Self {
        Self {
            tools,
            reasoner,
            retry: RetryPolicy::default(),
            reasoning_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_reasoning_timeout(mut self, timeout: Duration) -> Self {
        self.reasoning_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.tools.registry()
    }

    pub fn reasoner_name(&self) -> &str {
        self.reasoner.name()
    }

    /// 带重试的工具调用（超时由 ToolExecutor 负责）
    pub async fn call_tool(&self, name: &str, query: ToolQuery) -> Result<ToolResponse, ToolFailure> {
        let label = format!("tool:{name}");
        self.retry
            .run(&label, |_| {
                let tools = Arc::clone(&self.tools);
                let name = name.to_string();
                let query = query.clone();
                async move { tools.call(&name, query).await }
            })
            .await
    }

    /// 带超时与重试的推理调用
    pub async fn reason(&self, prompt: &Prompt) -> Result<String, ToolFailure> {
        let label = format!("reasoner:{}", prompt.role);
        let limit = self.reasoning_timeout;
        self.retry
            .run(&label, |_| {
                let reasoner = Arc::clone(&self.reasoner);
                let prompt = prompt.clone();
                async move {
                    match tokio::time::timeout(limit, reasoner.generate(&prompt)).await {
                        Ok(result) => result,
                        Err(_) => Err(ToolFailure::Timeout(format!(
                            "{} reasoning exceeded {} ms",
                            prompt.role,
                            limit.as_millis()
                        ))),
                    }
                }
            })
            .await
    }
}
