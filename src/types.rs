use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ── Records ─────────────────────────────────────────────────────────────

/// Founders as the model reports them: one comma-separated string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Founders {
    Joined(String),
    List(Vec<String>),
}

impl Founders {
    /// Flattens to the single `", "`-separated string stored in the table.
    /// Blank entries are dropped and every name is trimmed.
    pub fn joined(&self) -> String {
        match self {
            Founders::Joined(s) => s.trim().to_string(),
            Founders::List(names) => names
                .iter()
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Unvalidated record handed back by the extraction collaborator.
///
/// Every field is optional: the model may omit keys, send `null`, or send
/// an empty string, and the formatter decides what each absence means.
/// Unknown keys (including any `S.No.` the model invents) are ignored.
///
/// Each field has several accepted spellings. When a reply carries more
/// than one of them, the first non-blank one in this order wins:
///
/// | field               | keys, by precedence                                      |
/// |---------------------|----------------------------------------------------------|
/// | `name`              | `company_name`, `name`, `Company Name`, `company`        |
/// | `founding_date_raw` | `founding_date`, `founding_date_raw`, `Founding Date`    |
/// | `founders`          | `founders`, `Founders`                                   |
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordKeys")]
pub struct RawRecord {
    #[serde(rename = "company_name")]
    pub name: Option<String>,

    #[serde(rename = "founding_date")]
    pub founding_date_raw: Option<String>,

    pub founders: Option<Founders>,
}

impl RawRecord {
    pub fn new(
        name:              impl Into<String>,
        founding_date_raw: impl Into<String>,
        founders:          impl Into<String>,
    ) -> Self {
        Self {
            name:              Some(name.into()),
            founding_date_raw: Some(founding_date_raw.into()),
            founders:          Some(Founders::Joined(founders.into())),
        }
    }
}

/// Every key spelling the model has been seen to use, kept apart so that a
/// reply carrying two of them still decodes.
#[derive(Deserialize)]
struct RecordKeys {
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "Company Name")]
    company_name_titled: Option<String>,
    #[serde(default)]
    company: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    founding_date: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    founding_date_raw: Option<String>,
    #[serde(default, rename = "Founding Date", deserialize_with = "string_or_number")]
    founding_date_titled: Option<String>,

    #[serde(default)]
    founders: Option<Founders>,
    #[serde(default, rename = "Founders")]
    founders_titled: Option<Founders>,
}

impl From<RecordKeys> for RawRecord {
    fn from(keys: RecordKeys) -> Self {
        Self {
            name: first_filled([
                keys.company_name,
                keys.name,
                keys.company_name_titled,
                keys.company,
            ]),
            founding_date_raw: first_filled([
                keys.founding_date,
                keys.founding_date_raw,
                keys.founding_date_titled,
            ]),
            founders: keys.founders.or(keys.founders_titled),
        }
    }
}

/// First candidate with visible text; falls back to the first one present
/// so that an explicit `""` still reads as "given but empty".
fn first_filled<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    let present: Vec<String> = candidates.into_iter().flatten().collect();
    let pick = present.iter().position(|s| !s.trim().is_empty()).unwrap_or(0);
    present.into_iter().nth(pick)
}

/// Models sometimes answer `"founding_date": 1998` instead of a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// One persisted row of the output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRow {
    #[serde(rename = "S.No.")]
    pub serial_number: u64,
    pub name:          String,
    pub founding_date: String,
    pub founders:      String,
}

// ── Model exchange ──────────────────────────────────────────────────────

/// A tool the model asked to run, with its decoded arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-issued id, echoed back with the tool result
    pub id:   Option<String>,
    pub name: String,
    pub args: HashMap<String, Value>,
}

/// How a tool is advertised to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSchema {
    pub name:         String,
    pub description:  String,
    /// JSON Schema of the arguments object
    pub input_schema: Value,
}

/// A finished tool call and the text handed back to the model for it.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub step:   usize,
    pub call:   ToolCall,
    /// `SUCCESS: ...` or `ERROR: ...`
    pub result: String,
    pub ok:     bool,
}

impl Turn {
    /// The id pairing the call with its result; synthesized when the
    /// provider sent none.
    pub fn call_id(&self) -> String {
        self.call.id.clone().unwrap_or_else(|| format!("call_{}", self.step))
    }
}

/// One model turn, reduced to what this crate acts on.
#[derive(Debug, Clone)]
pub enum LlmReply {
    Tool(ToolCall),
    /// The extraction JSON, or the agent's closing remark
    Text(String),
}

/// Model settings shared by the extractor and the save agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Empty lets the caller pick its provider default
    pub model: String,
    pub temperature: f32,
    /// Planning rounds the save agent may use before it is stopped
    pub max_steps: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { model: String::new(), temperature: 0.0, max_steps: 5 }
    }
}
