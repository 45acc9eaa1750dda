//! 推理层：Reasoner 抽象与实现（模板 / OpenAI 兼容）

pub mod openai;
pub mod template;
pub mod traits;

pub use openai::{OpenAiReasoner, TokenUsage};
pub use template::TemplateReasoner;
pub use traits::{Prompt, Reasoner};
