//! 顺序编排器
//!
//! 严格按声明顺序执行；每个阶段看到此前累积的上下文，其产物写入后下一阶段才开始。
//! 失败阶段不终止运行，仅记录日志并在最终结果的失败汇总中体现。
//! 每个阶段在独立任务中运行并立即等待其句柄：panic 的阶段记为 Failed{Aborted}，后续阶段照常执行。

use std::sync::Arc;
use std::time::Instant;

use crate::core::{FailureKind, Request, SharedContext, StageId, StageInfo};
use crate::specialists::Specialist;
use crate::workflow::{log_outcome, settle};

pub struct SequentialOrchestrator {
    name: String,
    stages: Vec<Arc<dyn Specialist>>,
}

impl std::fmt::Debug for SequentialOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialOrchestrator")
            .field("name", &self.name)
            .field("stages", &self.stage_ids())
            .finish()
    }
}

impl SequentialOrchestrator {
    pub(crate) fn new(name: String, stages: Vec<Arc<dyn Specialist>>) -> Self {
        Self { name, stages }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage_ids(&self) -> Vec<StageId> {
        self.stages.iter().map(|s| s.id().clone()).collect()
    }

    pub fn stage_infos(&self) -> Vec<StageInfo> {
        self.stages.iter().map(|s| s.info().clone()).collect()
    }

    pub async fn run(&self, request: Arc<Request>) -> SharedContext {
        let ctx = SharedContext::new(request);
        let run_started = Instant::now();
        tracing::info!(
            run_id = ctx.run_id(),
            pipeline = %self.name,
            stages = self.stages.len(),
            "sequential run started"
        );

        for (step, stage) in self.stages.iter().enumerate() {
            tracing::info!(run_id = ctx.run_id(), stage = %stage.id(), step = step + 1, "stage started");
            let started = Instant::now();
            let handle = {
                let stage = Arc::clone(stage);
                let ctx = ctx.clone();
                tokio::spawn(async move { stage.run(&ctx).await })
            };
            let artifact = match handle.await {
                Ok(artifact) => settle(stage.info(), artifact),
                Err(err) => {
                    tracing::warn!(
                        run_id = ctx.run_id(),
                        stage = %stage.id(),
                        panicked = err.is_panic(),
                        "stage task ended abnormally"
                    );
                    stage
                        .info()
                        .failed(FailureKind::Aborted, "stage task ended without producing an artifact")
                }
            };
            log_outcome(&artifact, started.elapsed());
            if let Err(e) = ctx.record(artifact) {
                tracing::warn!(run_id = ctx.run_id(), error = %e, "artifact dropped");
            }
        }

        tracing::info!(
            run_id = ctx.run_id(),
            pipeline = %self.name,
            elapsed_ms = run_started.elapsed().as_millis() as u64,
            "sequential run finished"
        );
        ctx
    }
}
