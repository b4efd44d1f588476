//! End-to-end extraction tests: mock model → formatter → CSV table.

use company_extractor::llm::MockLlmCaller;
use company_extractor::pipeline::{process_essay, process_paragraph, process_with_agent, split_paragraphs};
use company_extractor::{
    AgentConfig, CompanyTable, ExtractError, LlmExtractor, LlmReply, RecordExtractor, ToolCall,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

const ESSAY: &str = "
    Google LLC was founded on September 4, 1998, by Larry Page and Sergey Brin.

    Microsoft was established in 1975 by Bill Gates and Paul Allen.
    Amazon, founded by Jeff Bezos in July 1994, began as an online bookstore.
";

const GOOGLE: &str = r#"{"company_name": "Google LLC", "founding_date": "1998-09-04", "founders": "Larry Page, Sergey Brin"}"#;
const MICROSOFT: &str = r#"```json
{"S.No.": 2, "company_name": "Microsoft", "founding_date": "1975", "founders": ["Bill Gates", "Paul Allen"]}
```"#;
const AMAZON: &str = r#"Sure! {"company_name": "Amazon", "founding_date": "1994-07", "founders": "Jeff Bezos"}"#;

fn extractor(mock: Arc<MockLlmCaller>) -> LlmExtractor {
    LlmExtractor::new(mock, AgentConfig::default())
}

fn table_in(dir: &TempDir, name: &str) -> CompanyTable {
    CompanyTable::new(dir.path().join(name))
}

#[test]
fn test_split_paragraphs_drops_blank_lines() {
    let paragraphs = split_paragraphs(ESSAY);
    assert_eq!(paragraphs.len(), 3);
    assert!(paragraphs[0].starts_with("Google LLC"));
    assert!(paragraphs[2].ends_with("bookstore."));
}

#[tokio::test]
async fn test_essay_rows_are_numbered_in_order() {
    let dir = TempDir::new().unwrap();
    let table = table_in(&dir, "company_info.csv");
    let mock = Arc::new(MockLlmCaller::answering([GOOGLE, MICROSOFT, AMAZON]));

    let outcomes = process_essay(&extractor(mock.clone()), ESSAY, &table).await;

    assert_eq!(outcomes.len(), 3);
    let rows = table.rows().unwrap();
    let serials: Vec<u64> = rows.iter().map(|r| r.serial_number).collect();
    assert_eq!(serials, vec![1, 2, 3]);

    assert_eq!(rows[0].founding_date, "1998-09-04");
    assert_eq!(rows[1].founding_date, "1975-01-01");
    assert_eq!(rows[1].founders, "Bill Gates, Paul Allen");
    assert_eq!(rows[2].founding_date, "1994-07-01");

    assert_eq!(mock.call_count(), 3);
    let second = mock.request(1).unwrap();
    assert!(second.prompt.contains("Microsoft was established in 1975"));
    assert!(second.tools.is_empty(), "extraction offers no tools");

    let text = std::fs::read_to_string(table.path()).unwrap();
    assert!(text.starts_with("S.No.,name,founding_date,founders\n"));
    assert_eq!(text.matches("S.No.").count(), 1, "header written once");
}

#[tokio::test]
async fn test_failed_paragraph_appends_nothing_and_leaves_no_gap() {
    let dir = TempDir::new().unwrap();
    let table = table_in(&dir, "company_info.csv");
    let mock = Arc::new(MockLlmCaller::scripted(vec![
        Ok(LlmReply::Text(GOOGLE.to_string())),
        Err("OpenAI API error: 503 Service Unavailable".to_string()),
        Ok(LlmReply::Text(AMAZON.to_string())),
    ]));

    let outcomes = process_essay(&extractor(mock), ESSAY, &table).await;

    assert!(outcomes[0].result.is_ok());
    assert!(matches!(outcomes[1].result, Err(ExtractError::Llm(_))));
    assert_eq!(outcomes[2].result.as_ref().unwrap().serial_number, 2);
    assert_eq!(table.row_count().unwrap(), 2);
}

#[tokio::test]
async fn test_missing_or_garbage_dates_reject_the_record() {
    let dir = TempDir::new().unwrap();
    let table = table_in(&dir, "company_info.csv");
    let mock = Arc::new(MockLlmCaller::answering([
        r#"{"company_name": "Nameless Co", "founders": "Nobody"}"#,
        r#"{"company_name": "Vague Inc", "founding_date": "a long time ago", "founders": "Someone"}"#,
        "I could not find a company in this paragraph.",
    ]));
    let ext = extractor(mock);

    let missing = process_paragraph(&ext, "p1", &table).await;
    let garbage = process_paragraph(&ext, "p2", &table).await;
    let prose = process_paragraph(&ext, "p3", &table).await;

    assert!(matches!(missing, Err(ExtractError::MissingField("founding_date"))));
    assert!(matches!(garbage, Err(ExtractError::InvalidDate(_))));
    assert!(matches!(prose, Err(ExtractError::MalformedOutput(_))));
    assert_eq!(table.row_count().unwrap(), 0);
    assert!(!table.path().exists(), "no file is created when nothing is appended");
}

#[tokio::test]
async fn test_existing_table_continues_numbering() {
    let dir = TempDir::new().unwrap();
    let table = table_in(&dir, "company_info.csv");
    std::fs::write(
        table.path(),
        "S.No.,name,founding_date,founders\n1,Apple,1976-04-01,\"Steve Jobs, Steve Wozniak\"\n",
    )
    .unwrap();

    let mock = Arc::new(MockLlmCaller::answering([GOOGLE]));
    let row = process_paragraph(&extractor(mock), "Google...", &table).await.unwrap();

    assert_eq!(row.serial_number, 2);
    assert_eq!(table.rows().unwrap()[0].founders, "Steve Jobs, Steve Wozniak");
}

#[tokio::test]
async fn test_extraction_is_deterministic_for_same_output() {
    let dir = TempDir::new().unwrap();
    let table = table_in(&dir, "company_info.csv");
    let mock = Arc::new(MockLlmCaller::answering([AMAZON, AMAZON]));
    let ext = extractor(mock);

    let first = process_paragraph(&ext, "Amazon", &table).await.unwrap();
    let second = process_paragraph(&ext, "Amazon", &table).await.unwrap();

    assert_eq!((first.serial_number, second.serial_number), (1, 2));
    assert_eq!(
        (&first.name, &first.founding_date, &first.founders),
        (&second.name, &second.founding_date, &second.founders)
    );
}

#[tokio::test]
async fn test_extractor_rejects_tool_calls() {
    let mock = Arc::new(MockLlmCaller::new(vec![LlmReply::Tool(ToolCall {
        id: None, name: "CSV_Writer".into(), args: HashMap::new(),
    })]));
    let config = AgentConfig { model: "gpt-4o".to_string(), ..AgentConfig::default() };

    let err = LlmExtractor::new(mock.clone(), config).extract("Google...").await.unwrap_err();
    assert!(matches!(err, ExtractError::MalformedOutput(_)));
    assert_eq!(mock.request(0).unwrap().model, "gpt-4o");
}

fn csv_writer_call(args: serde_json::Value) -> LlmReply {
    let args: HashMap<String, serde_json::Value> = serde_json::from_value(args).unwrap();
    LlmReply::Tool(ToolCall { id: Some("call_1".into()), name: "CSV_Writer".into(), args })
}

fn amazon_args() -> serde_json::Value {
    json!({ "company_name": "Amazon", "founding_date": "1994-07", "founders": "Jeff Bezos" })
}

#[tokio::test]
async fn test_agent_path_uses_its_own_table_and_counter() {
    let dir = TempDir::new().unwrap();
    let direct = table_in(&dir, "company_info.csv");
    let agent_table = table_in(&dir, "company_info_agent.csv");

    let direct_mock = Arc::new(MockLlmCaller::answering([GOOGLE, MICROSOFT]));
    process_essay(&extractor(direct_mock), "Google\nMicrosoft", &direct).await;

    // One shared caller: extraction answer, then the agent's tool call and closing remark.
    let mock = Arc::new(MockLlmCaller::new(vec![
        LlmReply::Text(AMAZON.to_string()),
        csv_writer_call(amazon_args()),
        LlmReply::Text("Saved Amazon.".to_string()),
    ]));

    let outcome = process_with_agent(
        &extractor(mock.clone()),
        mock.clone(),
        &AgentConfig::default(),
        "Amazon, founded by Jeff Bezos in July 1994",
        &agent_table,
    )
    .await
    .unwrap();

    assert!(outcome.finished);
    assert_eq!(outcome.answer, "Saved Amazon.");
    assert_eq!(outcome.row.as_ref().unwrap().serial_number, 1, "agent table numbers independently");
    assert!(mock.request(1).unwrap().prompt.starts_with("Save this data to CSV: {"));

    let agent_rows = agent_table.rows().unwrap();
    assert_eq!(agent_rows.len(), 1);
    assert_eq!(agent_rows[0].founding_date, "1994-07-01");
    assert_eq!(direct.row_count().unwrap(), 2);
}

#[tokio::test]
async fn test_agent_path_saves_one_row_per_extraction() {
    let dir = TempDir::new().unwrap();
    let agent_table = table_in(&dir, "company_info_agent.csv");
    let mock = Arc::new(MockLlmCaller::new(vec![
        LlmReply::Text(AMAZON.to_string()),
        csv_writer_call(amazon_args()),
        csv_writer_call(amazon_args()),
        LlmReply::Text("Saved twice?".to_string()),
    ]));

    let outcome = process_with_agent(&extractor(mock.clone()), mock, &AgentConfig::default(), "Amazon", &agent_table)
        .await
        .unwrap();

    assert_eq!(outcome.row.unwrap().serial_number, 1);
    assert_eq!(agent_table.row_count().unwrap(), 1);
}

#[tokio::test]
async fn test_agent_hitting_step_limit_after_saving_keeps_exactly_one_row() {
    let dir = TempDir::new().unwrap();
    let agent_table = table_in(&dir, "company_info_agent.csv");
    let mut replies = vec![LlmReply::Text(AMAZON.to_string())];
    replies.extend((0..6).map(|_| csv_writer_call(amazon_args())));
    let mock = Arc::new(MockLlmCaller::new(replies));

    let outcome = process_with_agent(&extractor(mock.clone()), mock, &AgentConfig::default(), "Amazon", &agent_table)
        .await
        .expect("a saved row is reported even when the run does not close");

    assert!(!outcome.finished);
    assert!(outcome.answer.contains("Max steps"));
    assert_eq!(outcome.row.unwrap().serial_number, 1);
    assert_eq!(agent_table.row_count().unwrap(), 1);
}

#[tokio::test]
async fn test_agent_run_that_saves_nothing_is_an_error() {
    let dir = TempDir::new().unwrap();
    let agent_table = table_in(&dir, "company_info_agent.csv");
    let mock = Arc::new(MockLlmCaller::scripted(vec![
        Ok(LlmReply::Text(AMAZON.to_string())),
        Err("Network error: connection reset".to_string()),
    ]));

    let result = process_with_agent(&extractor(mock.clone()), mock, &AgentConfig::default(), "Amazon", &agent_table).await;

    assert!(matches!(result, Err(ExtractError::Agent(_))));
    assert!(!agent_table.path().exists());
}

#[tokio::test]
async fn test_agent_path_surfaces_extraction_failure() {
    let dir = TempDir::new().unwrap();
    let agent_table = table_in(&dir, "company_info_agent.csv");
    let mock = Arc::new(MockLlmCaller::answering(["no json here"]));

    let result = process_with_agent(
        &extractor(mock.clone()),
        mock.clone(),
        &AgentConfig::default(),
        "paragraph",
        &agent_table,
    )
    .await;

    assert!(matches!(result, Err(ExtractError::MalformedOutput(_))));
    assert_eq!(mock.call_count(), 1, "agent never starts after a failed extraction");
    assert_eq!(agent_table.row_count().unwrap(), 0);
}
