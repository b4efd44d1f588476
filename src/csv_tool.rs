//! The `CSV_Writer` tool the agent uses to persist a record.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use crate::agent::ToolFn;
use crate::formatter::format_record;
use crate::parser::parse_raw_record;
use crate::table::CompanyTable;
use crate::types::{RawRecord, StoredRow, ToolSchema};

pub const CSV_WRITER: &str = "CSV_Writer";

const DESCRIPTION: &str =
    "Writes extracted company data to a CSV file. Input should be the fields \
     company_name, founding_date and founders. Saves one record; call it once.";

/// One extraction's worth of `CSV_Writer`: the first successful call appends
/// a row to the table, every later call is refused.
///
/// Clones share the saved-row slot, so the tool body handed to the agent and
/// the handle kept by the caller see the same state.
#[derive(Debug, Clone)]
pub struct CsvWriter {
    table: CompanyTable,
    saved: Arc<Mutex<Option<StoredRow>>>,
}

impl CsvWriter {
    pub fn new(table: CompanyTable) -> Self {
        Self { table, saved: Arc::new(Mutex::new(None)) }
    }

    pub fn schema() -> ToolSchema {
        ToolSchema {
            name:         CSV_WRITER.to_string(),
            description:  DESCRIPTION.to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "company_name":  { "type": "string", "description": "Company name" },
                    "founding_date": { "type": "string", "description": "Founding date, YYYY, YYYY-MM or YYYY-MM-DD" },
                    "founders":      { "type": "string", "description": "Comma-separated founder names" }
                },
                "required": ["company_name", "founding_date", "founders"]
            }),
        }
    }

    /// The tool body to register with the agent.
    pub fn tool(&self) -> ToolFn {
        let writer = self.clone();
        Box::new(move |args: &HashMap<String, Value>| writer.save(args))
    }

    /// The row this writer appended, if any.
    pub fn saved_row(&self) -> Option<StoredRow> {
        self.saved.lock().ok()?.clone()
    }

    fn save(&self, args: &HashMap<String, Value>) -> Result<String, String> {
        // Held across the append so a second call cannot slip in between.
        let mut saved = self.saved.lock().map_err(|_| "CSV_Writer state poisoned".to_string())?;
        if let Some(row) = saved.as_ref() {
            return Err(format!(
                "record already saved as row {}; do not call {} again",
                row.serial_number, CSV_WRITER
            ));
        }

        let raw = raw_record_from_args(args)?;
        let record = format_record(&raw).map_err(|e| e.to_string())?;
        let row = self.table.append(&record).map_err(|e| e.to_string())?;
        tracing::info!(
            path   = %self.table.path().display(),
            serial = row.serial_number,
            name   = %row.name,
            "agent row appended"
        );

        let reply = format!("Data saved to CSV as row {}", row.serial_number);
        *saved = Some(row);
        Ok(reply)
    }
}

/// Models either fill the schema fields or pass the whole record as a
/// JSON string under a single key such as `input`.
fn raw_record_from_args(args: &HashMap<String, Value>) -> Result<RawRecord, String> {
    if let [(_, Value::String(s))] = args.iter().collect::<Vec<_>>().as_slice() {
        if s.contains('{') {
            return parse_raw_record(s).map_err(|e| e.to_string());
        }
    }
    let object: serde_json::Map<String, Value> =
        args.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    serde_json::from_value(Value::Object(object))
        .map_err(|e| format!("Invalid {} arguments: {}", CSV_WRITER, e))
}
