//! 根分发器：判定请求形态，交给对应编排器，最后合成
//!
//! - Planning → SequentialOrchestrator（天气 → 新闻 → 安全 → 行程）
//! - Creative → ParallelOrchestrator（主题 / 菜单 / 活动 / 预算）

use std::sync::Arc;

use crate::core::{Request, RequestMode};
use crate::synthesis::{RunResult, Synthesizer};
use crate::workflow::{ParallelOrchestrator, SequentialOrchestrator};

pub struct RootDispatcher {
    planning: SequentialOrchestrator,
    creative: ParallelOrchestrator,
    synthesizer: Synthesizer,
}

impl RootDispatcher {
    pub fn new(planning: SequentialOrchestrator, creative: ParallelOrchestrator) -> Self {
        Self {
            planning,
            creative,
            synthesizer: Synthesizer::new(),
        }
    }

    pub fn planning(&self) -> &SequentialOrchestrator {
        &self.planning
    }

    pub fn creative(&self) -> &ParallelOrchestrator {
        &self.creative
    }

    /// 处理一次请求；永不失败，所有阶段错误都体现在结果里
    pub async fn handle(&self, request: Request) -> RunResult {
        let mode = select_mode(&request);
        tracing::info!(mode = %mode, goal = %request.goal, "request dispatched");
        let request = Arc::new(request);
        match mode {
            RequestMode::Planning => {
                let ctx = self.planning.run(request).await;
                self.synthesizer.run(&ctx, &self.planning.stage_infos(), mode)
            }
            RequestMode::Creative => {
                let ctx = self.creative.run(request).await;
                self.synthesizer.run(&ctx, &self.creative.stage_infos(), mode)
            }
        }
    }
}

/// 形态判定：显式 mode 优先；出行字段 → Planning；宾客 / 场合 / 预算 → Creative；其余按 Planning
pub fn select_mode(request: &Request) -> RequestMode {
    if let Some(mode) = request.mode {
        return mode;
    }
    if request.destination().is_some() || request.start_date.is_some() || request.trip_days.is_some() {
        return RequestMode::Planning;
    }
    if request.guest_count.is_some() || request.occasion().is_some() || request.budget.is_some() {
        return RequestMode::Creative;
    }
    RequestMode::Planning
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_mode_wins() {
        let req = Request::new("x")
            .with_destination("Goa")
            .with_mode(RequestMode::Creative);
        assert_eq!(select_mode(&req), RequestMode::Creative);
    }

    #[test]
    fn test_mode_inferred_from_fields() {
        assert_eq!(select_mode(&Request::new("x").with_trip_days(4)), RequestMode::Planning);
        assert_eq!(select_mode(&Request::new("x").with_guest_count(12)), RequestMode::Creative);
        assert_eq!(select_mode(&Request::new("x").with_occasion("Diwali")), RequestMode::Creative);
        // 出行字段优先于庆典字段
        let both = Request::new("x").with_destination("Jaipur").with_budget(5000.0);
        assert_eq!(select_mode(&both), RequestMode::Planning);
        assert_eq!(select_mode(&Request::new("surprise me")), RequestMode::Planning);
    }
}
