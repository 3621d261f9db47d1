//! 时间工具函数: 日期解析与账期归一化
//!
//! 所有日期→时间戳转换统一在 handler / engine 层完成，
//! repository 层只接收 `i64` Unix millis。所有计算均为 UTC。

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use shared::types::DateInput;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid date '{input}': expected YYYY-MM, YYYY-MM-DD, RFC 3339 or Unix millis")]
pub struct DateParseError {
    pub input: String,
}

impl DateParseError {
    fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Resolve a client date to Unix millis.
///
/// Date-only strings map to 00:00:00 UTC of that day, `YYYY-MM` to the
/// first day of the month. All-digit strings are read as millis, so query
/// strings can carry timestamps too.
pub fn parse_instant(input: &DateInput) -> Result<i64, DateParseError> {
    let text = match input {
        DateInput::Millis(millis) => return check_range(*millis),
        DateInput::Text(text) => text.trim(),
    };

    if !text.is_empty() && text.trim_start_matches('-').bytes().all(|b| b.is_ascii_digit()) {
        let millis: i64 = text.parse().map_err(|_| DateParseError::new(text))?;
        return check_range(millis);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return day_start_millis(date).ok_or_else(|| DateParseError::new(text));
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d") {
        return day_start_millis(date).ok_or_else(|| DateParseError::new(text));
    }
    Err(DateParseError::new(text))
}

/// Resolve a client date and snap it to the first instant of its month
pub fn parse_month(input: &DateInput) -> Result<i64, DateParseError> {
    let millis = parse_instant(input)?;
    month_start(millis).ok_or_else(|| DateParseError::new(input.to_string()))
}

/// First instant (UTC) of the month containing `millis`
pub fn month_start(millis: i64) -> Option<i64> {
    let dt = DateTime::<Utc>::from_timestamp_millis(millis)?;
    let first = NaiveDate::from_ymd_opt(dt.year(), dt.month(), 1)?;
    day_start_millis(first)
}

/// `YYYY-MM` label of the month containing `millis`
pub fn month_label(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Month starts of the `count` months ending with the month of `now`,
/// oldest first.
pub fn trailing_month_starts(now: i64, count: u32) -> Vec<i64> {
    let Some(dt) = DateTime::<Utc>::from_timestamp_millis(now) else {
        return Vec::new();
    };
    // Months since year 0, so subtraction never has to borrow years by hand
    let current = dt.year() as i64 * 12 + dt.month0() as i64;
    (0..count as i64)
        .rev()
        .filter_map(|back| {
            let index = current - back;
            let year = index.div_euclid(12) as i32;
            let month = index.rem_euclid(12) as u32 + 1;
            NaiveDate::from_ymd_opt(year, month, 1).and_then(day_start_millis)
        })
        .collect()
}

fn day_start_millis(date: NaiveDate) -> Option<i64> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive).timestamp_millis())
}

fn check_range(millis: i64) -> Result<i64, DateParseError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|_| millis)
        .ok_or_else(|| DateParseError::new(millis.to_string()))
}
