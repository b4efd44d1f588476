use crate::types::{AgentConfig, LlmReply, ToolSchema, Turn};
use async_trait::async_trait;

mod openai;
mod anthropic;
mod mock;

pub use openai::{OpenAiCaller, GEMINI_API_BASE, OPENAI_API_BASE};
pub use anthropic::AnthropicCaller;
pub use mock::MockLlmCaller;

/// Everything a provider needs for one chat completion.
///
/// `turns` replays earlier tool calls and their results after the user
/// prompt; `tools` is empty for a plain completion.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system:      &'a str,
    pub prompt:      &'a str,
    pub turns:       &'a [Turn],
    pub tools:       &'a [ToolSchema],
    /// Empty means the caller's default model
    pub model:       &'a str,
    pub temperature: f32,
}

impl<'a> ChatRequest<'a> {
    /// A single tool-less user turn.
    pub fn prompt_only(prompt: &'a str, config: &'a AgentConfig) -> Self {
        Self {
            system:      "",
            prompt,
            turns:       &[],
            tools:       &[],
            model:       &config.model,
            temperature: config.temperature,
        }
    }

    fn model_or<'b>(&self, default: &'b str) -> &'b str
    where
        'a: 'b,
    {
        if self.model.is_empty() { default } else { self.model }
    }
}

/// The seam between this crate and an LLM provider.
///
/// Implementations return `Err(String)` for transport, authentication and
/// decoding failures; nothing above this layer retries. A tool call in the
/// reply wins over any text next to it.
#[async_trait]
pub trait AsyncLlmCaller: Send + Sync {
    async fn call_async(&self, request: &ChatRequest<'_>) -> Result<LlmReply, String>;
}
