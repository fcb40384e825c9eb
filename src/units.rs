//! Unit and timestamp conversion rules shared by the provider adapters.
//!
//! All functions are pure. Column-level helpers map over nullable values so a
//! missing observation stays missing.

use crate::error::{GlmMetError, Result};
use chrono::NaiveDateTime;

const MM_PER_M: f64 = 1000.0;
const HOURS_PER_DAY: f64 = 24.0;
const GLM_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Percent (0 to 100) to fraction (0 to 1).
pub fn percent_to_fraction(percent: f64) -> f64 {
    percent / 100.0
}

/// Daily precipitation sum in millimetres to metres per day.
pub fn mm_to_m(mm: f64) -> f64 {
    mm / MM_PER_M
}

/// Hourly precipitation in millimetres to the daily-equivalent rate in metres
/// per day that GLM expects even for sub-daily input.
pub fn hourly_mm_to_daily_m(mm: f64) -> f64 {
    (mm / MM_PER_M) * HOURS_PER_DAY
}

/// Applies a scalar rule to every present value of a column.
pub fn map_present(values: Vec<Option<f64>>, rule: fn(f64) -> f64) -> Vec<Option<f64>> {
    values.into_iter().map(|v| v.map(rule)).collect()
}

/// Replaces a provider's sentinel for "no data" with a real missing value.
pub fn mask_fill_value(values: Vec<Option<f64>>, fill_value: f64) -> Vec<Option<f64>> {
    values
        .into_iter()
        .map(|v| v.filter(|x| (x - fill_value).abs() > f64::EPSILON))
        .collect()
}

/// `2020-01-01T13:00` to `2020-01-01 13:00:00`.
///
/// Open-Meteo reports to the minute, so seconds are appended verbatim.
pub fn iso_minute_to_glm(timestamp: &str) -> String {
    format!("{}:00", timestamp.replacen('T', " ", 1))
}

/// `2022010113` (year, month, day, hour) to `2022-01-01 13:00:00`.
pub fn compact_hour_to_glm(timestamp: &str) -> Result<String> {
    NaiveDateTime::parse_from_str(&format!("{timestamp}00"), "%Y%m%d%H%M")
        .map(|t| t.format(GLM_TIME_FORMAT).to_string())
        .map_err(|_| GlmMetError::InvalidTimestamp(timestamp.to_string()))
}
