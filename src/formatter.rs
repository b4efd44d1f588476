use crate::date::FoundingDate;
use crate::error::ExtractError;
use crate::types::RawRecord;

/// A record that passed validation and is ready to be numbered and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub name:          String,
    pub founding_date: FoundingDate,
    pub founders:      String,
}

/// Converts a `RawRecord` into its storable form.
///
/// The founding date is the only field whose absence rejects the record;
/// an unknown name or founder list is stored as an empty string. Pure and
/// deterministic: the same input always yields the same output.
pub fn format_record(raw: &RawRecord) -> Result<NormalizedRecord, ExtractError> {
    let date_raw = raw
        .founding_date_raw
        .as_deref()
        .ok_or(ExtractError::MissingField("founding_date"))?;
    let founding_date = FoundingDate::parse(date_raw)?;

    Ok(NormalizedRecord {
        name:     raw.name.as_deref().map(str::trim).unwrap_or_default().to_string(),
        founding_date,
        founders: raw.founders.as_ref().map(|f| f.joined()).unwrap_or_default(),
    })
}
