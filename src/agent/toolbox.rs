use std::collections::HashMap;

use serde_json::Value;

use crate::types::{ToolCall, ToolSchema};

/// A tool body: decoded JSON arguments in, observation text or error out.
pub type ToolFn = Box<dyn Fn(&HashMap<String, Value>) -> Result<String, String> + Send + Sync>;

/// The tools offered to the agent, in the order they were added.
#[derive(Default)]
pub struct Toolbox {
    schemas: Vec<ToolSchema>,
    bodies:  Vec<ToolFn>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `body` under `schema.name`, replacing a tool of the same name.
    pub fn add(&mut self, schema: ToolSchema, body: ToolFn) {
        match self.schemas.iter().position(|s| s.name == schema.name) {
            Some(i) => {
                self.schemas[i] = schema;
                self.bodies[i] = body;
            }
            None => {
                self.schemas.push(schema);
                self.bodies.push(body);
            }
        }
    }

    pub fn schemas(&self) -> &[ToolSchema] {
        &self.schemas
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Runs the tool `call` names. An unknown name is an `Err` the model
    /// gets to see, like any other tool failure.
    pub fn run(&self, call: &ToolCall) -> Result<String, String> {
        let i = self.schemas.iter().position(|s| s.name == call.name)
            .ok_or_else(|| format!("Tool '{}' not found; available: {}", call.name, self.names()))?;
        (self.bodies[i])(&call.args)
    }

    fn names(&self) -> String {
        self.schemas.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(", ")
    }
}
