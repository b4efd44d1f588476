//! Founding-date normalization.
//!
//! The model reports dates at whatever precision the paragraph gave it.
//! Every recognised form is widened to a canonical `YYYY-MM-DD` string:
//!
//! | input            | granularity | output       |
//! |------------------|-------------|--------------|
//! | `1998`           | year        | `1998-01-01` |
//! | `1998-9`         | month       | `1998-09-01` |
//! | `July 1994`      | month       | `1994-07-01` |
//! | `1998-09-04`     | day         | `1998-09-04` |
//! | `4 Sept. 1998`   | day         | `1998-09-04` |
//!
//! Empty input is [`ExtractError::MissingField`]; anything else that does
//! not resolve to a real calendar date is [`ExtractError::InvalidDate`].

use chrono::NaiveDate;
use std::fmt;
use crate::error::ExtractError;

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// How much of the date the source actually stated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Month,
    Year,
}

/// A validated founding date. Missing month/day are already defaulted to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundingDate {
    date:        NaiveDate,
    granularity: Granularity,
}

impl FoundingDate {
    pub fn parse(raw: &str) -> Result<Self, ExtractError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ExtractError::MissingField("founding_date"));
        }

        parse_numeric(trimmed)
            .or_else(|| parse_named(trimmed))
            .ok_or_else(|| ExtractError::InvalidDate(raw.to_string()))
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    fn build(year: i32, month: u32, day: u32, granularity: Granularity) -> Option<Self> {
        if !(1..=9999).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day).map(|date| Self { date, granularity })
    }
}

impl fmt::Display for FoundingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))
    }
}

/// Normalizes a raw founding date to `YYYY-MM-DD`.
pub fn normalize_founding_date(raw: &str) -> Result<String, ExtractError> {
    FoundingDate::parse(raw).map(|d| d.to_string())
}

/// `YYYY`, `YYYY-M`, `YYYY-MM-DD`; `/` or `.` may stand in for `-`, but
/// one date uses one separator throughout.
fn parse_numeric(s: &str) -> Option<FoundingDate> {
    let mut separators = s.chars().filter(|c| matches!(c, '-' | '/' | '.'));
    if let Some(first) = separators.next() {
        if separators.any(|c| c != first) {
            return None;
        }
    }

    let parts: Vec<&str> = s.split(['-', '/', '.']).collect();
    if parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    if parts[0].len() != 4 || parts[1..].iter().any(|p| p.len() > 2) {
        return None;
    }

    let year: i32 = parts[0].parse().ok()?;
    match parts.as_slice() {
        [_] => FoundingDate::build(year, 1, 1, Granularity::Year),
        [_, m] => FoundingDate::build(year, m.parse().ok()?, 1, Granularity::Month),
        [_, m, d] => FoundingDate::build(year, m.parse().ok()?, d.parse().ok()?, Granularity::Day),
        _ => None,
    }
}

/// `July 1994`, `September 4, 1998`, `4 September 1998`, `Sep 4th 1998`.
fn parse_named(s: &str) -> Option<FoundingDate> {
    let tokens: Vec<&str> = s
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    match tokens.as_slice() {
        [month, year] => FoundingDate::build(
            parse_year(year)?, month_from_name(month)?, 1, Granularity::Month,
        ),
        [a, b, year] => {
            let (month, day) = match month_from_name(a) {
                Some(m) => (m, parse_day(b)?),
                None    => (month_from_name(b)?, parse_day(a)?),
            };
            FoundingDate::build(parse_year(year)?, month, day, Granularity::Day)
        }
        _ => None,
    }
}

fn parse_year(token: &str) -> Option<i32> {
    if token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

fn parse_day(token: &str) -> Option<u32> {
    let lower = token.to_ascii_lowercase();
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| lower.strip_suffix(*suffix))
        .unwrap_or(&lower);
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Full names and unambiguous prefixes of at least three letters (`Sep`, `Sept.`).
fn month_from_name(token: &str) -> Option<u32> {
    let lower = token.trim_end_matches('.').to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(lower.as_str()))
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_only_defaults_to_january_first() {
        assert_eq!(normalize_founding_date("1998").unwrap(), "1998-01-01");
        assert_eq!(FoundingDate::parse("1975").unwrap().granularity(), Granularity::Year);
    }

    #[test]
    fn year_month_defaults_day() {
        assert_eq!(normalize_founding_date("1998-09").unwrap(), "1998-09-01");
        assert_eq!(normalize_founding_date("1994-7").unwrap(), "1994-07-01");
        assert_eq!(normalize_founding_date("1994/07").unwrap(), "1994-07-01");
    }

    #[test]
    fn full_date_passes_through_padded() {
        assert_eq!(normalize_founding_date("1998-09-04").unwrap(), "1998-09-04");
        assert_eq!(normalize_founding_date("1998-9-4").unwrap(), "1998-09-04");
        assert_eq!(normalize_founding_date(" 2004.02.04 ").unwrap(), "2004-02-04");
    }

    #[test]
    fn month_name_forms() {
        assert_eq!(normalize_founding_date("September 4, 1998").unwrap(), "1998-09-04");
        assert_eq!(normalize_founding_date("4 September 1998").unwrap(), "1998-09-04");
        assert_eq!(normalize_founding_date("Sept. 4th, 1998").unwrap(), "1998-09-04");
        assert_eq!(normalize_founding_date("July 1994").unwrap(), "1994-07-01");
        assert_eq!(FoundingDate::parse("Jul 1994").unwrap().granularity(), Granularity::Month);
    }

    #[test]
    fn empty_is_missing_not_defaulted() {
        assert!(matches!(
            FoundingDate::parse("   "),
            Err(ExtractError::MissingField("founding_date"))
        ));
    }

    #[test]
    fn garbage_and_impossible_dates_are_rejected() {
        for raw in ["unknown", "98", "1998-13", "1998-02-30", "1998-09-04-01", "Smarch 1998", "19980904"] {
            assert!(
                matches!(FoundingDate::parse(raw), Err(ExtractError::InvalidDate(_))),
                "expected InvalidDate for {raw:?}"
            );
        }
    }

    #[test]
    fn mixed_separators_are_rejected() {
        for raw in ["1998/09-04", "1998.09/04", "1998-09.04"] {
            assert!(matches!(FoundingDate::parse(raw), Err(ExtractError::InvalidDate(_))), "{raw:?}");
        }
        assert_eq!(normalize_founding_date("1998/09/04").unwrap(), "1998-09-04");
    }

    #[test]
    fn parsed_date_exposes_calendar_value() {
        let parsed = FoundingDate::parse("1994-7").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(1994, 7, 1).unwrap());
        assert_eq!(parsed.granularity(), Granularity::Month);
    }

    #[test]
    fn output_is_always_ten_chars() {
        for raw in ["0999", "2001-1", "2001-01-1", "March 2001"] {
            assert_eq!(normalize_founding_date(raw).unwrap().len(), 10, "{raw:?}");
        }
    }
}
