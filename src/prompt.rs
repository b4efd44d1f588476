//! Prompt text sent to the model.

const EXTRACTION_TEMPLATE: &str = "\
You are an intelligent agent tasked with extracting company details from a paragraph. For the paragraph, identify:
- Company Name (string)
- Founding Date (format as YYYY-MM-DD; if only year is provided, use January 1st; if year and month, use 1st of the month)
- Founders (list of names as a comma-separated string)

Input paragraph: {paragraph}

Return ONLY the extracted information as a valid JSON string:
{\"company_name\": \"<string>\", \"founding_date\": \"<YYYY-MM-DD>\", \"founders\": \"<comma-separated string>\"}";

/// System prompt for the agent that persists records through `CSV_Writer`.
pub const AGENT_SYSTEM_PROMPT: &str = "\
You are a record-keeping assistant. You are given company data as JSON. \
Call the CSV_Writer tool exactly once with the fields company_name, founding_date and founders \
copied from that JSON. When the tool reports success or an error, reply with a one-line summary \
and do not call any tool again.";

/// Builds the extraction prompt for one paragraph.
pub fn extraction_prompt(paragraph: &str) -> String {
    EXTRACTION_TEMPLATE.replace("{paragraph}", paragraph.trim())
}

/// Builds the agent task that asks for `record_json` to be saved.
pub fn agent_task(record_json: &str) -> String {
    format!("Save this data to CSV: {}", record_json)
}
