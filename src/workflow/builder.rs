//! 流水线构建器
//!
//! 构建期一次性校验，运行期不再出现结构性错误：
//! 阶段列表非空、阶段标识与产物族唯一、依赖已排在前面（顺序）或不在集合内（并行）、所需工具均已注册。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{HiveError, StageId};
use crate::specialists::Specialist;
use crate::tools::ToolRegistry;
use crate::workflow::{ParallelOrchestrator, SequentialOrchestrator};

pub struct PipelineBuilder {
    name: String,
    stages: Vec<Arc<dyn Specialist>>,
    available_tools: HashSet<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Topology {
    Sequential,
    Parallel,
}

impl PipelineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            available_tools: HashSet::new(),
        }
    }

    /// 追加阶段（顺序拓扑下即执行顺序）
    pub fn stage(self, stage: impl Specialist + 'static) -> Self {
        self.stage_arc(Arc::new(stage))
    }

    pub fn stage_arc(mut self, stage: Arc<dyn Specialist>) -> Self {
        self.stages.push(stage);
        self
    }

    /// 声明可用工具（用于校验 required_tools）
    pub fn tools(mut self, registry: &ToolRegistry) -> Self {
        self.available_tools.extend(registry.tool_names());
        self
    }

    fn validate(&self, topology: Topology) -> Result<(), HiveError> {
        if self.stages.is_empty() {
            return Err(HiveError::EmptyPipeline(self.name.clone()));
        }

        let all_ids: HashSet<&StageId> = self.stages.iter().map(|s| s.id()).collect();
        let mut seen_ids: HashSet<&StageId> = HashSet::new();
        let mut seen_families = HashSet::new();

        for stage in &self.stages {
            let id = stage.id();
            if !seen_ids.insert(id) {
                return Err(HiveError::DuplicateStage(id.to_string()));
            }
            if !seen_families.insert(stage.family()) {
                return Err(HiveError::DuplicateFamily {
                    stage: id.to_string(),
                    family: stage.family().to_string(),
                });
            }

            for dep in stage.depends_on() {
                match topology {
                    Topology::Sequential if dep == *id || !seen_ids.contains(&dep) => {
                        return Err(HiveError::DependencyOrder {
                            stage: id.to_string(),
                            dependency: dep.to_string(),
                        });
                    }
                    Topology::Parallel if all_ids.contains(&dep) => {
                        return Err(HiveError::ParallelDependency {
                            stage: id.to_string(),
                            dependency: dep.to_string(),
                        });
                    }
                    _ => {}
                }
            }

            for tool in stage.required_tools() {
                if !self.available_tools.contains(tool) {
                    return Err(HiveError::MissingTool {
                        stage: id.to_string(),
                        tool: tool.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn build_sequential(self) -> Result<SequentialOrchestrator, HiveError> {
        self.validate(Topology::Sequential)?;
        tracing::debug!(pipeline = %self.name, stages = self.stages.len(), "sequential pipeline built");
        Ok(SequentialOrchestrator::new(self.name, self.stages))
    }

    pub fn build_parallel(self, run_timeout: Duration) -> Result<ParallelOrchestrator, HiveError> {
        self.validate(Topology::Parallel)?;
        tracing::debug!(pipeline = %self.name, stages = self.stages.len(), "parallel stage set built");
        Ok(ParallelOrchestrator::new(self.name, self.stages, run_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ArtifactFamily;
    use crate::specialists::testing::StubWeather;
    use crate::workflow::testing::{Journal, ScriptedStage};

    fn journal() -> Journal {
        Journal::default()
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        let err = PipelineBuilder::new("planning").build_sequential().unwrap_err();
        assert!(matches!(err, HiveError::EmptyPipeline(name) if name == "planning"));
    }

    #[test]
    fn test_duplicate_stage_and_family() {
        let j = journal();
        let err = PipelineBuilder::new("p")
            .stage(ScriptedStage::new("a", ArtifactFamily::Theme, &j))
            .stage(ScriptedStage::new("a", ArtifactFamily::Menu, &j))
            .build_parallel(Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, HiveError::DuplicateStage(id) if id == "a"));

        let err = PipelineBuilder::new("p")
            .stage(ScriptedStage::new("a", ArtifactFamily::Theme, &j))
            .stage(ScriptedStage::new("b", ArtifactFamily::Theme, &j))
            .build_sequential()
            .unwrap_err();
        assert!(matches!(err, HiveError::DuplicateFamily { stage, .. } if stage == "b"));
    }

    #[test]
    fn test_dependency_must_come_first() {
        let j = journal();
        let err = PipelineBuilder::new("p")
            .stage(ScriptedStage::new("plan", ArtifactFamily::Itinerary, &j).after("weather"))
            .stage(ScriptedStage::new("weather", ArtifactFamily::Weather, &j))
            .build_sequential()
            .unwrap_err();
        assert!(matches!(err, HiveError::DependencyOrder { stage, dependency } if stage == "plan" && dependency == "weather"));

        let ok = PipelineBuilder::new("p")
            .stage(ScriptedStage::new("weather", ArtifactFamily::Weather, &j))
            .stage(ScriptedStage::new("plan", ArtifactFamily::Itinerary, &j).after("weather"))
            .build_sequential();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_parallel_rejects_internal_dependency() {
        let j = journal();
        let err = PipelineBuilder::new("p")
            .stage(ScriptedStage::new("theme", ArtifactFamily::Theme, &j))
            .stage(ScriptedStage::new("menu", ArtifactFamily::Menu, &j).after("theme"))
            .build_parallel(Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, HiveError::ParallelDependency { .. }));
    }

    #[test]
    fn test_required_tool_must_be_registered() {
        let j = journal();
        let err = PipelineBuilder::new("p")
            .stage(ScriptedStage::new("weather", ArtifactFamily::Weather, &j).needs_tool("weather"))
            .build_sequential()
            .unwrap_err();
        assert!(matches!(err, HiveError::MissingTool { tool, .. } if tool == "weather"));

        let mut registry = ToolRegistry::new();
        registry.register(StubWeather::mild());
        let ok = PipelineBuilder::new("p")
            .tools(&registry)
            .stage(ScriptedStage::new("weather", ArtifactFamily::Weather, &j).needs_tool("weather"))
            .build_sequential();
        assert!(ok.is_ok());
    }
}
