use std::sync::Arc;

use crate::agent::phase::Phase;
use crate::agent::session::{Session, Trace};
use crate::agent::states::handler_for;
use crate::agent::toolbox::{ToolFn, Toolbox};
use crate::error::AgentError;
use crate::llm::AsyncLlmCaller;
use crate::types::{AgentConfig, ToolSchema};

/// A tool-calling agent driven phase by phase until it answers or fails.
pub struct Agent {
    pub session: Session,
    tools:       Toolbox,
    llm:         Arc<dyn AsyncLlmCaller>,
    phase:       Phase,
}

impl Agent {
    /// Runs to a terminal phase and returns the model's closing text.
    ///
    /// Tool failures are not errors: they go back to the model as turns.
    /// The run fails on an LLM error or when `max_steps` planning rounds
    /// pass without an answer.
    pub async fn run(&mut self) -> Result<String, AgentError> {
        // Each round trip is at most three handler calls.
        let cap = self.session.config.max_steps * 3 + 3;
        let mut calls = 0;

        while let Some(handler) = handler_for(self.phase) {
            calls += 1;
            if calls > cap {
                return Err(AgentError::SafetyCapExceeded(calls));
            }

            let signal = handler.handle(&mut self.session, &self.tools, self.llm.as_ref()).await;
            let next = self.phase.after(signal)
                .ok_or(AgentError::InvalidTransition { from: self.phase, signal })?;
            tracing::debug!(from = %self.phase, %signal, to = %next, "transition");
            self.phase = next;
        }

        self.session.close(self.phase);
        match self.phase {
            Phase::Done => Ok(self.session.answer.clone().unwrap_or_default()),
            _ => Err(AgentError::AgentFailed(
                self.session.failure.clone().unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn trace(&self) -> &Trace {
        &self.session.trace
    }
}

pub struct AgentBuilder {
    session: Session,
    tools:   Toolbox,
    llm:     Option<Arc<dyn AsyncLlmCaller>>,
}

impl AgentBuilder {
    pub fn new(task: impl Into<String>) -> Self {
        Self { session: Session::new(task), tools: Toolbox::new(), llm: None }
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.session.system_prompt = prompt.into();
        self
    }

    pub fn llm(mut self, llm: Arc<dyn AsyncLlmCaller>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.session.config = config;
        self
    }

    pub fn max_steps(mut self, n: usize) -> Self {
        self.session.config.max_steps = n;
        self
    }

    pub fn tool(mut self, schema: ToolSchema, body: ToolFn) -> Self {
        self.tools.add(schema, body);
        self
    }

    pub fn build(self) -> Result<Agent, AgentError> {
        let llm = self.llm
            .ok_or_else(|| AgentError::BuildError("an LLM caller is required".to_string()))?;
        if self.tools.is_empty() {
            return Err(AgentError::BuildError("at least one tool is required".to_string()));
        }
        Ok(Agent { session: self.session, tools: self.tools, llm, phase: Phase::Idle })
    }
}
