//! Anthropic Messages API over `reqwest`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::llm::{AsyncLlmCaller, ChatRequest};
use crate::types::{LlmReply, ToolCall, ToolSchema};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesBody<'a> {
    model:       &'a str,
    max_tokens:  u32,
    temperature: f32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system:      &'a str,
    #[serde(skip_serializing_if = "no_tools")]
    tools:       &'a [ToolSchema],
    messages:    Vec<Message>,
}

fn no_tools(tools: &&[ToolSchema]) -> bool {
    tools.is_empty()
}

#[derive(Serialize)]
struct Message {
    role:    &'static str,
    content: Value,
}

#[derive(Deserialize)]
struct MessagesReply {
    content: Vec<Block>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Block {
    Text { text: String },
    ToolUse { id: String, name: String, input: Value },
    #[serde(other)]
    Other,
}

pub struct AnthropicCaller {
    client:        reqwest::Client,
    api_key:       String,
    api_base:      String,
    default_model: String,
}

impl AnthropicCaller {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client:        reqwest::Client::new(),
            api_key:       api_key.into(),
            api_base:      "https://api.anthropic.com".to_string(),
            default_model: "claude-3-5-haiku-latest".to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// The prompt as the opening user message, then each replayed turn as a
/// `tool_use` block answered by a `tool_result` block.
fn messages(request: &ChatRequest<'_>) -> Vec<Message> {
    let mut out = vec![Message { role: "user", content: json!(request.prompt) }];
    for turn in request.turns {
        let id = turn.call_id();
        out.push(Message {
            role:    "assistant",
            content: json!([{ "type": "tool_use", "id": id, "name": turn.call.name, "input": turn.call.args }]),
        });
        out.push(Message {
            role:    "user",
            content: json!([{ "type": "tool_result", "tool_use_id": id, "content": turn.result, "is_error": !turn.ok }]),
        });
    }
    out
}

#[async_trait]
impl AsyncLlmCaller for AnthropicCaller {
    async fn call_async(&self, request: &ChatRequest<'_>) -> Result<LlmReply, String> {
        let body = MessagesBody {
            model:       request.model_or(&self.default_model),
            max_tokens:  1024,
            temperature: request.temperature,
            system:      request.system,
            tools:       request.tools,
            messages:    messages(request),
        };

        let response = self.client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(format!("Anthropic API error {}: {}", status, detail));
        }

        let reply: MessagesReply = response.json().await
            .map_err(|e| format!("Failed to parse Anthropic response: {}", e))?;

        let mut text = String::new();
        for block in reply.content {
            match block {
                Block::ToolUse { id, name, input } => {
                    let args = serde_json::from_value(input)
                        .map_err(|e| format!("Invalid tool args: {}", e))?;
                    return Ok(LlmReply::Tool(ToolCall { id: Some(id), name, args }));
                }
                Block::Text { text: part } => text.push_str(&part),
                Block::Other => {}
            }
        }

        if text.is_empty() {
            Err("Anthropic returned empty content".to_string())
        } else {
            Ok(LlmReply::Text(text))
        }
    }
}
