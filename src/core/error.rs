//! 错误类型
//!
//! 三层错误：工具边界的 ToolFailure、构建期的 HiveError、SharedContext 的 ContextError。
//! 运行期失败一律在最低层吸收并降级为 Artifact 状态，不会向上抛出。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 工具（或推理能力）调用失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolFailure {
    #[error("Tool timeout: {0}")]
    Timeout(String),

    #[error("Tool unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid tool response: {0}")]
    InvalidResponse(String),
}

impl ToolFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            ToolFailure::Timeout(_) => FailureKind::Timeout,
            ToolFailure::Unavailable(_) => FailureKind::Unavailable,
            ToolFailure::InvalidResponse(_) => FailureKind::InvalidResponse,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ToolFailure::Timeout(d) | ToolFailure::Unavailable(d) | ToolFailure::InvalidResponse(d) => d,
        }
    }

    /// 超时与不可用视为瞬时故障，可重试；格式错误重试无意义
    pub fn is_retryable(&self) -> bool {
        matches!(self, ToolFailure::Timeout(_) | ToolFailure::Unavailable(_))
    }
}

/// Artifact 失败原因分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Unavailable,
    InvalidResponse,
    /// 请求缺少该阶段必需的输入（如目的地）
    MissingInput,
    /// 阶段任务异常终止（panic 或被中止），未产出结果
    Aborted,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Unavailable => "unavailable",
            FailureKind::InvalidResponse => "invalid response",
            FailureKind::MissingInput => "missing input",
            FailureKind::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// 构建期错误：流水线校验、配置
#[derive(Error, Debug)]
pub enum HiveError {
    #[error("Pipeline '{0}' has no stages")]
    EmptyPipeline(String),

    #[error("Duplicate stage id: {0}")]
    DuplicateStage(String),

    #[error("Duplicate artifact family {family} (stage {stage})")]
    DuplicateFamily { stage: String, family: String },

    #[error("Stage {stage} depends on {dependency}, which is not scheduled before it")]
    DependencyOrder { stage: String, dependency: String },

    #[error("Stage {stage} depends on {dependency} inside a parallel stage set")]
    ParallelDependency { stage: String, dependency: String },

    #[error("Stage {stage} requires unregistered tool: {tool}")]
    MissingTool { stage: String, tool: String },

    #[error("Config error: {0}")]
    Config(String),
}

/// SharedContext 只追加：同一阶段不可写两次
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("Stage already recorded: {0}")]
    AlreadyRecorded(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(ToolFailure::Timeout("weather".into()).is_retryable());
        assert!(ToolFailure::Unavailable("503".into()).is_retryable());
        assert!(!ToolFailure::InvalidResponse("bad json".into()).is_retryable());
    }

    #[test]
    fn test_failure_kind_mapping() {
        assert_eq!(ToolFailure::Timeout("x".into()).kind(), FailureKind::Timeout);
        assert_eq!(ToolFailure::InvalidResponse("x".into()).kind(), FailureKind::InvalidResponse);
        assert_eq!(ToolFailure::Unavailable("down".into()).detail(), "down");
    }
}
