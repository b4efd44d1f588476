use std::fmt;

use serde::Serialize;

/// Where the save agent is in its call-tool-observe loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Idle,
    Planning,
    Acting,
    Observing,
    Done,
    Failed,
}

/// What a phase handler reports back to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Signal {
    Start,
    ToolRequested,
    Answered,
    StepLimit,
    Fatal,
    ToolSucceeded,
    ToolFailed,
    Continue,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }

    /// The phase entered after `signal`, or `None` if `self` never emits it.
    pub fn after(self, signal: Signal) -> Option<Phase> {
        use Phase::*;
        use Signal::*;

        match (self, signal) {
            (Idle, Start)                           => Some(Planning),
            (Planning, ToolRequested)               => Some(Acting),
            (Planning, Answered)                    => Some(Done),
            (Planning, StepLimit | Fatal)           => Some(Failed),
            (Acting, ToolSucceeded | ToolFailed)    => Some(Observing),
            (Acting, Fatal)                         => Some(Failed),
            (Observing, Continue)                   => Some(Planning),
            _                                       => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
