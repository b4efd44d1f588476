pub mod types;
pub mod date;
pub mod formatter;
pub mod table;
pub mod prompt;
pub mod parser;
pub mod extract;
pub mod pipeline;
pub mod config;
pub mod csv_tool;
pub mod agent;
pub mod error;
pub mod llm;

pub use types::{AgentConfig, Founders, LlmReply, RawRecord, StoredRow, ToolCall, ToolSchema, Turn};
pub use agent::{Agent, AgentBuilder, Phase, Signal};
pub use llm::{AsyncLlmCaller, ChatRequest};
pub use error::{AgentError, ExtractError};
pub use date::{normalize_founding_date, FoundingDate, Granularity};
pub use formatter::{format_record, NormalizedRecord};
pub use table::CompanyTable;
pub use csv_tool::CsvWriter;
pub use extract::{LlmExtractor, RecordExtractor};
pub use pipeline::{process_essay, process_paragraph, process_with_agent, split_paragraphs};
pub use config::{ExtractorConfig, Provider};
