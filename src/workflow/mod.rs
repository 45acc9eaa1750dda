//! 编排层：顺序流水线与并行扇出 / 汇合
//!
//! - **builder**: PipelineBuilder，构建期校验阶段列表
//! - **sequential**: 按依赖顺序逐个执行，产物依次写入 SharedContext
//! - **parallel**: 每阶段一个 tokio 任务，汇合屏障受整体超时约束

pub mod builder;
pub mod parallel;
pub mod sequential;

pub use builder::PipelineBuilder;
pub use parallel::ParallelOrchestrator;
pub use sequential::SequentialOrchestrator;

use std::time::Duration;

use crate::core::{Artifact, ArtifactStatus, StageInfo};

/// 保证产物的阶段标识与产物族与声明一致
pub(crate) fn settle(info: &StageInfo, mut artifact: Artifact) -> Artifact {
    if artifact.stage != info.id || artifact.family != info.family {
        tracing::warn!(
            stage = %info.id,
            reported = %artifact.stage,
            "artifact reported under a different stage, re-keyed"
        );
        artifact.stage = info.id.clone();
        artifact.family = info.family;
    }
    artifact
}

pub(crate) fn log_outcome(artifact: &Artifact, elapsed: Duration) {
    let elapsed_ms = elapsed.as_millis() as u64;
    match artifact.status {
        ArtifactStatus::Completed => {
            tracing::info!(stage = %artifact.stage, elapsed_ms, "stage completed")
        }
        ArtifactStatus::Degraded => tracing::warn!(
            stage = %artifact.stage,
            elapsed_ms,
            caveats = ?artifact.caveats,
            "stage degraded"
        ),
        ArtifactStatus::Failed => {
            let (kind, detail) = artifact
                .failure
                .as_ref()
                .map(|f| (f.kind.to_string(), f.detail.as_str()))
                .unwrap_or_else(|| ("unknown".to_string(), ""));
            tracing::warn!(stage = %artifact.stage, elapsed_ms, kind = %kind, detail, "stage failed")
        }
    }
}

/// 编排测试用的探针阶段
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::core::{
        Artifact, ArtifactFamily, ArtifactPayload, CreativeSuggestion, FailureKind, Idea, SharedContext,
        StageId, StageInfo,
    };
    use crate::specialists::Specialist;

    pub type Journal = Arc<Mutex<Vec<String>>>;

    pub struct ScriptedStage {
        pub info: StageInfo,
        pub delay: Duration,
        pub deps: Vec<StageId>,
        pub tools: Vec<&'static str>,
        pub panics: bool,
        pub fails: bool,
        pub journal: Journal,
    }

    impl ScriptedStage {
        pub fn new(id: &str, family: ArtifactFamily, journal: &Journal) -> Self {
            Self {
                info: StageInfo::new(id, family),
                delay: Duration::ZERO,
                deps: Vec::new(),
                tools: Vec::new(),
                panics: false,
                fails: false,
                journal: Arc::clone(journal),
            }
        }

        pub fn delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn after(mut self, dep: &str) -> Self {
            self.deps.push(StageId::from(dep));
            self
        }

        pub fn needs_tool(mut self, tool: &'static str) -> Self {
            self.tools.push(tool);
            self
        }

        pub fn panicking(mut self) -> Self {
            self.panics = true;
            self
        }

        pub fn failing(mut self) -> Self {
            self.fails = true;
            self
        }
    }

    #[async_trait]
    impl Specialist for ScriptedStage {
        fn info(&self) -> &StageInfo {
            &self.info
        }

        fn depends_on(&self) -> Vec<StageId> {
            self.deps.clone()
        }

        fn required_tools(&self) -> Vec<&'static str> {
            self.tools.clone()
        }

        async fn run(&self, ctx: &SharedContext) -> Artifact {
            // 记录开始时上下文中已有的阶段数
            self.journal
                .lock()
                .unwrap()
                .push(format!("start:{}:{}", self.info.id, ctx.len()));
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.panics {
                panic!("stage {} panicked", self.info.id);
            }
            self.journal.lock().unwrap().push(format!("end:{}", self.info.id));
            if self.fails {
                return self.info.failed(FailureKind::Unavailable, "scripted failure");
            }
            self.info.completed(ArtifactPayload::CreativeSuggestion(CreativeSuggestion {
                ideas: vec![Idea {
                    title: self.info.id.to_string(),
                    details: vec![],
                }],
            }))
        }
    }
}
