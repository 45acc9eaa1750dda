//! 推理能力抽象
//!
//! 每个专家持有一个 Reasoner：输入角色指令与请求摘要，输出文本。
//! 后端（模板 / OpenAI 兼容）可替换；失败以 ToolFailure 表示，与工具同样受超时与重试约束。

use async_trait::async_trait;

use crate::core::ToolFailure;

/// 一次推理调用的输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// 调用方阶段标识，如 theme_designer
    pub role: String,
    /// 角色指令（system）
    pub instruction: String,
    /// 请求摘要与上游产物摘要（user）
    pub brief: String,
}

impl Prompt {
    pub fn new(role: impl Into<String>, instruction: impl Into<String>, brief: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            instruction: instruction.into(),
            brief: brief.into(),
        }
    }
}

#[async_trait]
pub trait Reasoner: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &Prompt) -> Result<String, ToolFailure>;

    /// 累计 token 使用：(prompt, completion, total)
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
