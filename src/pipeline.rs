//! Paragraph-by-paragraph processing: the direct path writes rows itself,
//! the agent path lets a tool-calling agent write them through `CSV_Writer`.

use std::sync::Arc;

use crate::agent::AgentBuilder;
use crate::csv_tool::CsvWriter;
use crate::error::ExtractError;
use crate::extract::RecordExtractor;
use crate::formatter::format_record;
use crate::llm::AsyncLlmCaller;
use crate::prompt::{agent_task, AGENT_SYSTEM_PROMPT};
use crate::table::CompanyTable;
use crate::types::{AgentConfig, StoredRow};

/// Trimmed, non-empty lines of `text`, in order.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|p| !p.is_empty()).collect()
}

/// What happened to one paragraph of an essay.
#[derive(Debug)]
pub struct ParagraphOutcome {
    /// 1-based position among the essay's paragraphs
    pub index:     usize,
    pub paragraph: String,
    pub result:    Result<StoredRow, ExtractError>,
}

/// Extract → format → append for a single paragraph.
///
/// Nothing is appended unless extraction and formatting both succeed.
pub async fn process_paragraph(
    extractor: &dyn RecordExtractor,
    paragraph: &str,
    table:     &CompanyTable,
) -> Result<StoredRow, ExtractError> {
    let raw = extractor.extract(paragraph).await?;
    let record = format_record(&raw)?;
    table.append(&record)
}

/// Runs every paragraph of `essay` through [`process_paragraph`].
///
/// A failing paragraph is logged and reported in its outcome; the rest of
/// the essay is still processed.
pub async fn process_essay(
    extractor: &dyn RecordExtractor,
    essay:     &str,
    table:     &CompanyTable,
) -> Vec<ParagraphOutcome> {
    let mut outcomes = Vec::new();

    for (i, paragraph) in split_paragraphs(essay).into_iter().enumerate() {
        let index = i + 1;
        let result = process_paragraph(extractor, paragraph, table).await;

        match &result {
            Ok(row) => tracing::info!(
                paragraph = index,
                serial    = row.serial_number,
                name      = %row.name,
                date      = %row.founding_date,
                "row appended"
            ),
            Err(e) => tracing::error!(paragraph = index, error = %e, "paragraph skipped"),
        }

        outcomes.push(ParagraphOutcome { index, paragraph: paragraph.to_string(), result });
    }

    outcomes
}

/// Result of one agent-driven save.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// The agent's closing message, or why the run stopped
    pub answer:   String,
    /// The row `CSV_Writer` appended; at most one per extraction
    pub row:      Option<StoredRow>,
    /// False when the run stopped without a closing message
    pub finished: bool,
}

/// Extracts `paragraph`, then asks an agent holding only `CSV_Writer` to save
/// the record into `table`.
///
/// Returns `Err` only when nothing was appended. A run that saved its row
/// but then failed to close (step budget, LLM error) still reports the row.
pub async fn process_with_agent(
    extractor: &dyn RecordExtractor,
    llm:       Arc<dyn AsyncLlmCaller>,
    config:    &AgentConfig,
    paragraph: &str,
    table:     &CompanyTable,
) -> Result<AgentOutcome, ExtractError> {
    let raw = extractor.extract(paragraph).await?;
    let record_json = serde_json::to_string(&raw)?;

    let writer = CsvWriter::new(table.clone());
    let mut agent = AgentBuilder::new(agent_task(&record_json))
        .system_prompt(AGENT_SYSTEM_PROMPT)
        .llm(llm)
        .config(config.clone())
        .tool(CsvWriter::schema(), writer.tool())
        .build()?;

    let run = agent.run().await;
    tracing::debug!(trace = %agent.trace().to_json(), "agent trace");

    match (run, writer.saved_row()) {
        (Ok(answer), row) => {
            if row.is_none() {
                tracing::warn!(answer = %answer, "agent finished without saving a row");
            }
            Ok(AgentOutcome { answer, row, finished: true })
        }
        (Err(e), Some(row)) => {
            tracing::warn!(error = %e, serial = row.serial_number, "agent stopped after saving its row");
            Ok(AgentOutcome { answer: e.to_string(), row: Some(row), finished: false })
        }
        (Err(e), None) => Err(e.into()),
    }
}
