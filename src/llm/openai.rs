//! OpenAI 兼容推理后端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；
//! instruction 作为 system 消息，brief 作为 user 消息，取首条 content。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::core::ToolFailure;
use crate::llm::{Prompt, Reasoner};

/// Token 使用统计（累计值）
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: Arc<AtomicU64>,
    pub completion_tokens: Arc<AtomicU64>,
    pub total_tokens: Arc<AtomicU64>,
}

impl TokenUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, prompt: u64, completion: u64) {
        self.prompt_tokens.fetch_add(prompt, Ordering::Relaxed);
        self.completion_tokens.fetch_add(completion, Ordering::Relaxed);
        self.total_tokens.fetch_add(prompt + completion, Ordering::Relaxed);
    }

    pub fn get(&self) -> (u64, u64, u64) {
        (
            self.prompt_tokens.load(Ordering::Relaxed),
            self.completion_tokens.load(Ordering::Relaxed),
            self.total_tokens.load(Ordering::Relaxed),
        )
    }
}

pub struct OpenAiReasoner {
    client: Client<OpenAIConfig>,
    model: String,
    pub usage: TokenUsage,
}

impl OpenAiReasoner {
    pub fn new(base_url: Option<&str>, model: &str, api_key: &str) -> Self {
        let config = match base_url {
            Some(url) => OpenAIConfig::new().with_api_base(url).with_api_key(api_key),
            None => OpenAIConfig::new().with_api_key(api_key),
        };
        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            usage: TokenUsage::new(),
        }
    }

    fn to_messages(prompt: &Prompt) -> Result<Vec<ChatCompletionRequestMessage>, ToolFailure> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(prompt.instruction.clone())
            .build()
            .map_err(|e| ToolFailure::InvalidResponse(e.to_string()))?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.brief.clone())
            .build()
            .map_err(|e| ToolFailure::InvalidResponse(e.to_string()))?;
        Ok(vec![
            ChatCompletionRequestMessage::System(system),
            ChatCompletionRequestMessage::User(user),
        ])
    }
}

#[async_trait]
impl Reasoner for OpenAiReasoner {
    fn name(&self) -> &str {
        &self.model
    }

    fn token_usage(&self) -> (u64, u64, u64) {
        self.usage.get()
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, ToolFailure> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(Self::to_messages(prompt)?)
            .build()
            .map_err(|e| ToolFailure::InvalidResponse(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ToolFailure::Unavailable(e.to_string()))?;

        if let Some(usage) = &response.usage {
            self.usage
                .add(usage.prompt_tokens as u64, usage.completion_tokens as u64);
        }

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ToolFailure::InvalidResponse(format!("{}: empty completion", prompt.role)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_accumulates_across_calls() {
        let reasoner = OpenAiReasoner::new(Some("http://localhost:9/v1"), "gpt-4o-mini", "test-key");
        assert_eq!(reasoner.token_usage(), (0, 0, 0));
        reasoner.usage.add(120, 30);
        reasoner.usage.add(80, 20);
        assert_eq!(reasoner.token_usage(), (200, 50, 250));
        assert_eq!(reasoner.name(), "gpt-4o-mini");
    }
}
