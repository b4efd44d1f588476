use thiserror::Error;

use crate::agent::{Phase, Signal};

/// Failures of the extract → format → append pipeline.
///
/// Every variant means "no row was appended for this paragraph".
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("LLM caller error: {0}")]
    Llm(String),

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date format: {0:?}")]
    InvalidDate(String),

    #[error("Table I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractError {
    fn from(e: serde_json::Error) -> Self {
        ExtractError::MalformedOutput(e.to_string())
    }
}

/// Ways an agent run ends without an answer.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent failed: {0}")]
    AgentFailed(String),

    #[error("{from} has no transition for {signal}")]
    InvalidTransition { from: Phase, signal: Signal },

    #[error("Safety cap exceeded after {0} handler calls")]
    SafetyCapExceeded(usize),

    #[error("Cannot build agent: {0}")]
    BuildError(String),
}
