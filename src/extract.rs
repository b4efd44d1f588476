use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ExtractError;
use crate::llm::{AsyncLlmCaller, ChatRequest};
use crate::parser::parse_raw_record;
use crate::prompt::extraction_prompt;
use crate::types::{AgentConfig, LlmReply, RawRecord};

/// Turns one paragraph of free text into a candidate record.
#[async_trait]
pub trait RecordExtractor: Send + Sync {
    async fn extract(&self, paragraph: &str) -> Result<RawRecord, ExtractError>;
}

/// Extraction through a single, tool-less model call.
pub struct LlmExtractor {
    llm:    Arc<dyn AsyncLlmCaller>,
    config: AgentConfig,
}

impl LlmExtractor {
    pub fn new(llm: Arc<dyn AsyncLlmCaller>, config: AgentConfig) -> Self {
        Self { llm, config }
    }

    /// Raw model output for `paragraph`, before any parsing.
    pub async fn complete(&self, paragraph: &str) -> Result<String, ExtractError> {
        let prompt = extraction_prompt(paragraph);
        let request = ChatRequest::prompt_only(&prompt, &self.config);

        match self.llm.call_async(&request).await {
            Ok(LlmReply::Text(content)) => Ok(content),
            Ok(LlmReply::Tool(call)) => Err(ExtractError::MalformedOutput(format!(
                "unexpected tool call '{}' during extraction", call.name
            ))),
            Err(e) => Err(ExtractError::Llm(e)),
        }
    }
}

#[async_trait]
impl RecordExtractor for LlmExtractor {
    async fn extract(&self, paragraph: &str) -> Result<RawRecord, ExtractError> {
        let output = self.complete(paragraph).await?;
        tracing::debug!(output = %output, "extraction output");
        parse_raw_record(&output)
    }
}
