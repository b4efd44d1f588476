use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{AsyncLlmCaller, ChatRequest};
use crate::types::LlmReply;

/// What the mock saw on one call.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub model:  String,
    pub prompt: String,
    pub turns:  usize,
    pub tools:  Vec<String>,
}

/// Replays scripted replies in order and remembers every request.
/// `Err` entries stand in for provider failures; running out of script is
/// itself an error.
pub struct MockLlmCaller {
    script: Mutex<VecDeque<Result<LlmReply, String>>>,
    seen:   Mutex<Vec<SeenRequest>>,
}

impl MockLlmCaller {
    pub fn new(replies: Vec<LlmReply>) -> Self {
        Self::scripted(replies.into_iter().map(Ok).collect())
    }

    pub fn scripted(script: Vec<Result<LlmReply, String>>) -> Self {
        Self { script: Mutex::new(script.into()), seen: Mutex::new(Vec::new()) }
    }

    /// A caller whose every reply is plain text.
    pub fn answering<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(answers.into_iter().map(|a| LlmReply::Text(a.into())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().map(|seen| seen.len()).unwrap_or(0)
    }

    /// The request behind call `n` (0-based).
    pub fn request(&self, n: usize) -> Option<SeenRequest> {
        self.seen.lock().ok()?.get(n).cloned()
    }
}

#[async_trait]
impl AsyncLlmCaller for MockLlmCaller {
    async fn call_async(&self, request: &ChatRequest<'_>) -> Result<LlmReply, String> {
        self.seen.lock()
            .map_err(|_| "mock request log poisoned".to_string())?
            .push(SeenRequest {
                model:  request.model.to_string(),
                prompt: request.prompt.to_string(),
                turns:  request.turns.len(),
                tools:  request.tools.iter().map(|t| t.name.clone()).collect(),
            });

        self.script.lock()
            .map_err(|_| "mock script poisoned".to_string())?
            .pop_front()
            .unwrap_or_else(|| Err("mock script exhausted".to_string()))
    }
}
