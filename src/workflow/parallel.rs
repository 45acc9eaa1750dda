//! 并行编排器
//!
//! 每个阶段一个 tokio 任务，各自写入 SharedContext 中自己的键；汇合屏障等待全部任务，
//! 受整体运行超时约束。超时后触发取消令牌并中止在途任务，未产出的阶段记为 Failed{Timeout}；
//! 任务 panic 的阶段记为 Failed{Aborted}。

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::core::{FailureKind, Request, SharedContext, StageId, StageInfo};
use crate::specialists::Specialist;
use crate::workflow::{log_outcome, settle};

pub struct ParallelOrchestrator {
    name: String,
    stages: Vec<Arc<dyn Specialist>>,
    run_timeout: Duration,
}

impl std::fmt::Debug for ParallelOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelOrchestrator")
            .field("name", &self.name)
            .field("stages", &self.stage_ids())
            .field("run_timeout", &self.run_timeout)
            .finish()
    }
}

impl ParallelOrchestrator {
    pub(crate) fn new(name: String, stages: Vec<Arc<dyn Specialist>>, run_timeout: Duration) -> Self {
        Self {
            name,
            stages,
            run_timeout,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run_timeout(&self) -> Duration {
        self.run_timeout
    }

    pub fn stage_ids(&self) -> Vec<StageId> {
        self.stages.iter().map(|s| s.id().clone()).collect()
    }

    pub fn stage_infos(&self) -> Vec<StageInfo> {
        self.stages.iter().map(|s| s.info().clone()).collect()
    }

    pub async fn run(&self, request: Arc<Request>) -> SharedContext {
        let ctx = SharedContext::new(request);
        let cancel = CancellationToken::new();
        let run_started = Instant::now();
        tracing::info!(
            run_id = ctx.run_id(),
            pipeline = %self.name,
            stages = self.stages.len(),
            timeout_ms = self.run_timeout.as_millis() as u64,
            "parallel run started"
        );

        let mut tasks = JoinSet::new();
        for stage in &self.stages {
            let stage = Arc::clone(stage);
            let ctx = ctx.clone();
            let token = cancel.child_token();
            tasks.spawn(async move {
                let started = Instant::now();
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!(stage = %stage.id(), "stage cancelled");
                    }
                    artifact = stage.run(&ctx) => {
                        let artifact = settle(stage.info(), artifact);
                        log_outcome(&artifact, started.elapsed());
                        if let Err(e) = ctx.record(artifact) {
                            tracing::warn!(error = %e, "artifact dropped");
                        }
                    }
                }
            });
        }

        // 汇合屏障
        let joined = tokio::time::timeout(self.run_timeout, async {
            while let Some(outcome) = tasks.join_next().await {
                if let Err(err) = outcome {
                    if err.is_panic() {
                        tracing::warn!(run_id = ctx.run_id(), "stage task panicked");
                    }
                }
            }
        })
        .await;

        let timed_out = joined.is_err();
        if timed_out {
            tracing::warn!(
                run_id = ctx.run_id(),
                timeout_ms = self.run_timeout.as_millis() as u64,
                pending = tasks.len(),
                "run timeout reached, cancelling in-flight stages"
            );
            cancel.cancel();
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
        }

        // 汇合后每个阶段都必须有产物
        for stage in &self.stages {
            if ctx.contains(stage.id().as_str()) {
                continue;
            }
            let artifact = if timed_out {
                stage.info().failed(
                    FailureKind::Timeout,
                    format!("run timeout of {} ms elapsed before the stage finished", self.run_timeout.as_millis()),
                )
            } else {
                stage
                    .info()
                    .failed(FailureKind::Aborted, "stage task ended without producing an artifact")
            };
            log_outcome(&artifact, run_started.elapsed());
            if let Err(e) = ctx.record(artifact) {
                tracing::warn!(run_id = ctx.run_id(), error = %e, "artifact dropped");
            }
        }

        tracing::info!(
            run_id = ctx.run_id(),
            pipeline = %self.name,
            timed_out,
            elapsed_ms = run_started.elapsed().as_millis() as u64,
            "parallel run joined"
        );
        ctx
    }
}
