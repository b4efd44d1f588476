//! The tool-calling agent behind the agent write path.
//!
//! A run walks `Idle → Planning → (Acting → Observing → Planning)* → Done`,
//! or ends in `Failed` on an LLM error or an exhausted step budget.

mod phase;
mod runner;
mod session;
mod states;
mod toolbox;

pub use phase::{Phase, Signal};
pub use runner::{Agent, AgentBuilder};
pub use session::{Session, Trace, TraceEntry};
pub use states::{handler_for, Act, Begin, Observe, PhaseHandler, Plan};
pub use toolbox::{ToolFn, Toolbox};
