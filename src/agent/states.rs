//! One handler per non-terminal phase.
//!
//! A handler does its phase's work against the session and reports a
//! [`Signal`]; failures are recorded in the session, never raised.

use async_trait::async_trait;

use crate::agent::phase::{Phase, Signal};
use crate::agent::session::{clip, Session};
use crate::agent::toolbox::Toolbox;
use crate::llm::AsyncLlmCaller;
use crate::types::{LlmReply, Turn};

#[async_trait]
pub trait PhaseHandler: Send + Sync {
    async fn handle(&self, session: &mut Session, tools: &Toolbox, llm: &dyn AsyncLlmCaller) -> Signal;
}

/// The handler for `phase`; terminal phases have none.
pub fn handler_for(phase: Phase) -> Option<&'static dyn PhaseHandler> {
    match phase {
        Phase::Idle      => Some(&Begin),
        Phase::Planning  => Some(&Plan),
        Phase::Acting    => Some(&Act),
        Phase::Observing => Some(&Observe),
        Phase::Done | Phase::Failed => None,
    }
}

pub struct Begin;

#[async_trait]
impl PhaseHandler for Begin {
    async fn handle(&self, session: &mut Session, tools: &Toolbox, _llm: &dyn AsyncLlmCaller) -> Signal {
        let detail = format!("tools={} max_steps={} task={}", tools.len(), session.config.max_steps, clip(&session.task));
        session.note(Phase::Idle, "AGENT_STARTED", detail);
        Signal::Start
    }
}

/// Asks the model for the next move, within the step budget.
pub struct Plan;

#[async_trait]
impl PhaseHandler for Plan {
    async fn handle(&self, session: &mut Session, tools: &Toolbox, llm: &dyn AsyncLlmCaller) -> Signal {
        let limit = session.config.max_steps;
        if session.step >= limit {
            session.failure = Some(format!("Max steps {} exceeded", limit));
            session.note(Phase::Planning, "MAX_STEPS", format!("step={}", session.step));
            return Signal::StepLimit;
        }

        session.step += 1;
        session.note(Phase::Planning, "STEP_START", format!("step={}/{}", session.step, limit));

        let reply = llm.call_async(&session.request(tools.schemas())).await;
        match reply {
            Ok(LlmReply::Tool(call)) => {
                session.note(Phase::Planning, "LLM_TOOL_CALL", call.name.clone());
                session.pending = Some(call);
                Signal::ToolRequested
            }
            Ok(LlmReply::Text(text)) => {
                session.note(Phase::Planning, "LLM_ANSWER", clip(&text));
                session.answer = Some(text);
                Signal::Answered
            }
            Err(err) => {
                session.note(Phase::Planning, "LLM_ERROR", err.clone());
                session.failure = Some(format!("LLM error: {}", err));
                Signal::Fatal
            }
        }
    }
}

/// Runs the pending tool call.
pub struct Act;

#[async_trait]
impl PhaseHandler for Act {
    async fn handle(&self, session: &mut Session, tools: &Toolbox, _llm: &dyn AsyncLlmCaller) -> Signal {
        let (name, outcome) = match session.pending.as_ref() {
            Some(call) => (call.name.clone(), tools.run(call)),
            None => {
                session.failure = Some("no pending tool call".to_string());
                session.note(Phase::Acting, "FATAL_ERROR", "no pending tool call");
                return Signal::Fatal;
            }
        };

        let signal = match &outcome {
            Ok(result) => {
                session.note(Phase::Acting, "TOOL_SUCCESS", format!("{}: {}", name, clip(result)));
                Signal::ToolSucceeded
            }
            Err(err) => {
                tracing::warn!(tool = %name, error = %err, "tool failed");
                session.note(Phase::Acting, "TOOL_FAILURE", format!("{}: {}", name, err));
                Signal::ToolFailed
            }
        };
        session.outcome = Some(outcome);
        signal
    }
}

/// Folds the finished call into the turns replayed to the model.
pub struct Observe;

#[async_trait]
impl PhaseHandler for Observe {
    async fn handle(&self, session: &mut Session, _tools: &Toolbox, _llm: &dyn AsyncLlmCaller) -> Signal {
        if let (Some(call), Some(outcome)) = (session.pending.take(), session.outcome.take()) {
            let (ok, result) = match outcome {
                Ok(text) => (true, format!("SUCCESS: {}", text)),
                Err(text) => (false, format!("ERROR: {}", text)),
            };
            session.turns.push(Turn { step: session.step, call, result, ok });
            let detail = format!("step={} ok={} turns={}", session.step, ok, session.turns.len());
            session.note(Phase::Observing, "TURN_RECORDED", detail);
        }
        Signal::Continue
    }
}
