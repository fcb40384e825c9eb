use crate::error::{GlmMetError, Result};
use chrono::NaiveDate;

const ISO_FORMAT: &str = "%Y-%m-%d";
const COMPACT_FORMAT: &str = "%Y%m%d";

/// An inclusive range of calendar days with `start <= end`.
///
/// # Examples
///
/// ```
/// use glm_met::DateRange;
///
/// let range = DateRange::parse("2022-01-01", "20220131").unwrap();
/// assert_eq!(range.start_compact(), "20220101");
/// assert_eq!(range.end_iso(), "2022-01-31");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(GlmMetError::InvalidDateRange(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses both ends from either `YYYY-MM-DD` or `YYYYMMDD`.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_day(start)?, parse_day(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn start_iso(&self) -> String {
        self.start.format(ISO_FORMAT).to_string()
    }

    pub fn end_iso(&self) -> String {
        self.end.format(ISO_FORMAT).to_string()
    }

    pub fn start_compact(&self) -> String {
        self.start.format(COMPACT_FORMAT).to_string()
    }

    pub fn end_compact(&self) -> String {
        self.end.format(COMPACT_FORMAT).to_string()
    }
}

fn parse_day(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, ISO_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, COMPACT_FORMAT))
        .map_err(|_| {
            GlmMetError::InvalidDateRange(format!(
                "'{value}' is neither YYYY-MM-DD nor YYYYMMDD"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_formats() -> Result<()> {
        let iso = DateRange::parse("2020-01-01", "2020-01-31")?;
        let compact = DateRange::parse("20200101", "20200131")?;
        assert_eq!(iso, compact);
        assert_eq!(iso.start_iso(), "2020-01-01");
        assert_eq!(compact.end_compact(), "20200131");
        Ok(())
    }

    #[test]
    fn test_single_day_is_valid() {
        assert!(DateRange::parse("2022-06-30", "2022-06-30").is_ok());
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = DateRange::parse("2022-12-31", "2022-01-01").unwrap_err();
        assert!(matches!(err, GlmMetError::InvalidDateRange(_)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(DateRange::parse("01/01/2022", "2022-01-02").is_err());
        assert!(DateRange::parse("2022-02-30", "2022-03-01").is_err());
    }
}
