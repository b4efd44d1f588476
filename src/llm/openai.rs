use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage,
        ChatCompletionTool,
        ChatCompletionToolType,
        CreateChatCompletionRequestArgs,
        FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::llm::{AsyncLlmCaller, ChatRequest};
use crate::types::{LlmReply, ToolCall};

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Gemini's OpenAI-compatible endpoint.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Chat completions against OpenAI or any server speaking its API
/// (Gemini, Groq, Ollama, a local proxy).
pub struct OpenAiCaller {
    client:        Client<OpenAIConfig>,
    default_model: String,
}

impl OpenAiCaller {
    pub fn with_base_url(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_base(api_base).with_api_key(api_key);
        Self { client: Client::with_config(config), default_model: "gpt-4o-mini".to_string() }
    }

    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self::with_base_url(GEMINI_API_BASE, api_key).with_default_model("gemini-1.5-flash")
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }
}

/// System prompt, user prompt, then an assistant `tool_calls` message and
/// its `tool` result for every replayed turn.
fn chat_messages(request: &ChatRequest<'_>) -> Result<Vec<ChatCompletionRequestMessage>, String> {
    let mut messages = Vec::with_capacity(2 + request.turns.len() * 2);
    if !request.system.is_empty() {
        messages.push(json!({ "role": "system", "content": request.system }));
    }
    messages.push(json!({ "role": "user", "content": request.prompt }));

    for turn in request.turns {
        let id = turn.call_id();
        let arguments = serde_json::to_string(&turn.call.args).map_err(|e| e.to_string())?;
        messages.push(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": id,
                "type": "function",
                "function": { "name": turn.call.name, "arguments": arguments }
            }]
        }));
        messages.push(json!({ "role": "tool", "tool_call_id": id, "content": turn.result }));
    }

    serde_json::from_value(Value::Array(messages))
        .map_err(|e| format!("Failed to build messages: {}", e))
}

fn chat_tools(request: &ChatRequest<'_>) -> Vec<ChatCompletionTool> {
    request.tools.iter().map(|schema| ChatCompletionTool {
        r#type:   ChatCompletionToolType::Function,
        function: FunctionObject {
            name:        schema.name.clone(),
            description: Some(schema.description.clone()),
            parameters:  Some(schema.input_schema.clone()),
        },
    }).collect()
}

#[async_trait]
impl AsyncLlmCaller for OpenAiCaller {
    async fn call_async(&self, request: &ChatRequest<'_>) -> Result<LlmReply, String> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(request.model_or(&self.default_model))
            .messages(chat_messages(request)?)
            .temperature(request.temperature);
        if !request.tools.is_empty() {
            args.tools(chat_tools(request));
        }
        let body = args.build().map_err(|e| format!("Failed to build request: {}", e))?;

        let response = self.client.chat().create(body).await
            .map_err(|e| format!("OpenAI API error: {}", e))?;

        let message = response.choices.into_iter().next()
            .ok_or("Empty response from OpenAI")?
            .message;

        if let Some(call) = message.tool_calls.and_then(|calls| calls.into_iter().next()) {
            let args = serde_json::from_str(&call.function.arguments)
                .map_err(|e| format!("Failed to parse tool args: {}", e))?;
            return Ok(LlmReply::Tool(ToolCall { id: Some(call.id), name: call.function.name, args }));
        }

        message.content
            .map(LlmReply::Text)
            .ok_or_else(|| "No content in OpenAI response".to_string())
    }
}
