use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::agent::phase::Phase;
use crate::llm::ChatRequest;
use crate::types::{AgentConfig, ToolCall, ToolSchema, Turn};

/// One line of the run log.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    pub step:   usize,
    pub phase:  Phase,
    pub tag:    &'static str,
    pub detail: String,
    pub at:     DateTime<Utc>,
}

/// Everything the phase handlers did, in order.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Trace(Vec<TraceEntry>);

impl Trace {
    pub fn entries(&self) -> &[TraceEntry] {
        &self.0
    }

    pub fn in_phase(&self, phase: Phase) -> impl Iterator<Item = &TraceEntry> + '_ {
        self.0.iter().filter(move |e| e.phase == phase)
    }

    pub fn tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TraceEntry> + 'a {
        self.0.iter().filter(move |e| e.tag == tag)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Working state of one agent run.
///
/// Planning fills `pending`, Acting turns it into `outcome`, Observing folds
/// both into `turns`. `answer` and `failure` are the two ways a run ends.
#[derive(Debug)]
pub struct Session {
    pub task:          String,
    pub system_prompt: String,
    pub config:        AgentConfig,
    /// Planning rounds started so far
    pub step:          usize,
    pub pending:       Option<ToolCall>,
    pub outcome:       Option<Result<String, String>>,
    pub turns:         Vec<Turn>,
    pub answer:        Option<String>,
    pub failure:       Option<String>,
    pub trace:         Trace,
}

impl Session {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task:          task.into(),
            system_prompt: String::new(),
            config:        AgentConfig::default(),
            step:          0,
            pending:       None,
            outcome:       None,
            turns:         Vec::new(),
            answer:        None,
            failure:       None,
            trace:         Trace::default(),
        }
    }

    /// Logs through `tracing` and appends to the trace.
    pub fn note(&mut self, phase: Phase, tag: &'static str, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::debug!(step = self.step, %phase, tag, detail = %detail, "agent");
        self.trace.0.push(TraceEntry { step: self.step, phase, tag, detail, at: Utc::now() });
    }

    /// The next model request: task, replayed turns and the offered tools.
    pub fn request<'a>(&'a self, tools: &'a [ToolSchema]) -> ChatRequest<'a> {
        ChatRequest {
            system:      &self.system_prompt,
            prompt:      &self.task,
            turns:       &self.turns,
            tools,
            model:       &self.config.model,
            temperature: self.config.temperature,
        }
    }

    /// Closing trace entry once the run reached `phase`.
    pub(crate) fn close(&mut self, phase: Phase) {
        let (tag, detail) = match phase {
            Phase::Done => ("TASK_COMPLETE", self.answer.clone().unwrap_or_default()),
            _ => ("AGENT_FAILED", self.failure.clone().unwrap_or_else(|| "unknown error".to_string())),
        };
        self.note(phase, tag, clip(&detail));
    }
}

/// First 100 characters, for trace lines.
pub(crate) fn clip(text: &str) -> String {
    text.chars().take(100).collect()
}
