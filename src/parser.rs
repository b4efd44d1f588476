//! Decoding free-form model output into a `RawRecord`.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ExtractError;
use crate::types::RawRecord;

fn json_object_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Greedy and dot-matches-newline: first `{` to last `}`.
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("static regex"))
}

/// Returns the outermost `{...}` span of `output`, ignoring prose and
/// markdown fences around it.
pub fn extract_json_object(output: &str) -> Result<&str, ExtractError> {
    json_object_re()
        .find(output)
        .map(|m| m.as_str())
        .ok_or_else(|| ExtractError::MalformedOutput("no JSON object found in LLM output".to_string()))
}

/// Parses model output into a `RawRecord`.
pub fn parse_raw_record(output: &str) -> Result<RawRecord, ExtractError> {
    let json = extract_json_object(output)?;
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(ExtractError::MalformedOutput("expected a JSON object".to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Founders;

    #[test]
    fn parses_plain_json() {
        let raw = parse_raw_record(
            r#"{"company_name": "Google LLC", "founding_date": "1998-09-04", "founders": "Larry Page, Sergey Brin"}"#,
        )
        .unwrap();
        assert_eq!(raw.name.as_deref(), Some("Google LLC"));
        assert_eq!(raw.founding_date_raw.as_deref(), Some("1998-09-04"));
        assert_eq!(raw.founders, Some(Founders::Joined("Larry Page, Sergey Brin".into())));
    }

    #[test]
    fn strips_markdown_fence_and_prose() {
        let output = "Here you go:\n```json\n{\n  \"company_name\": \"Amazon\",\n  \"founding_date\": \"1994-07\",\n  \"founders\": [\"Jeff Bezos\"]\n}\n```\n";
        let raw = parse_raw_record(output).unwrap();
        assert_eq!(raw.name.as_deref(), Some("Amazon"));
        assert_eq!(raw.founders.unwrap().joined(), "Jeff Bezos");
    }

    #[test]
    fn ignores_model_serial_and_accepts_numeric_year() {
        let raw = parse_raw_record(r#"{"S.No.": 7, "name": "Microsoft", "founding_date": 1975, "founders": null}"#).unwrap();
        assert_eq!(raw.name.as_deref(), Some("Microsoft"));
        assert_eq!(raw.founding_date_raw.as_deref(), Some("1975"));
        assert!(raw.founders.is_none());
    }

    #[test]
    fn several_spellings_of_one_field_pick_by_precedence() {
        let raw = parse_raw_record(
            r#"{"name": "Google", "company_name": "Google LLC", "Founding Date": "1998", "founding_date": "", "Founders": ["Larry Page"]}"#,
        )
        .unwrap();
        assert_eq!(raw.name.as_deref(), Some("Google LLC"));
        assert_eq!(raw.founding_date_raw.as_deref(), Some("1998"));
        assert_eq!(raw.founders.unwrap().joined(), "Larry Page");
    }

    #[test]
    fn blank_field_stays_present_when_nothing_better_exists() {
        let raw = parse_raw_record(r#"{"company_name": " ", "founding_date": ""}"#).unwrap();
        assert_eq!(raw.name.as_deref(), Some(" "));
        assert_eq!(raw.founding_date_raw.as_deref(), Some(""));
    }

    #[test]
    fn missing_keys_become_none() {
        let raw = parse_raw_record("{}").unwrap();
        assert_eq!(raw, RawRecord::default());
    }

    #[test]
    fn no_object_is_malformed() {
        assert!(matches!(parse_raw_record("I could not find a company."), Err(ExtractError::MalformedOutput(_))));
        assert!(matches!(parse_raw_record("{not json}"), Err(ExtractError::MalformedOutput(_))));
    }
}
