//! Reader time zone handling.
//!
//! CSL readers stamp reads with their local wall-clock time and report the
//! zone separately as `H:MM` (hours may carry a sign). The offset computed
//! here is added to a local time parsed as if it were UTC to obtain the
//! true UTC instant.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Format of the `timeOfRead` field, e.g. `2023/06/01 10:00:00.000`.
///
/// The fractional part is optional.
pub const TIME_OF_READ_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.f";

const MAX_OFFSET_HOURS: u32 = 14;
const MILLIS_PER_MINUTE: i64 = 60_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeZoneError {
    #[error("empty time zone")]
    Empty,
    #[error("time zone '{0}' is not in H:MM form")]
    MissingSeparator(String),
    #[error("invalid time zone hours: '{0}'")]
    InvalidHours(String),
    #[error("invalid time zone minutes: '{0}'")]
    InvalidMinutes(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid time of read '{value}': {source}")]
pub struct TimeOfReadError {
    value: String,
    source: chrono::ParseError,
}

/// Correction from reader-local time to UTC, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeZoneOffset(i64);

impl TimeZoneOffset {
    pub const UTC: TimeZoneOffset = TimeZoneOffset(0);

    pub fn millis(self) -> i64 {
        self.0
    }
}

/// Parse a reader time zone such as `-5:00`, `+5:30` or `0:00`.
///
/// The sign applies to both hours and minutes and is read from the leading
/// character, so `-0:30` is thirty minutes behind UTC. The returned offset is
/// the negation of the zone's distance from UTC: `-5:00` yields
/// `+18_000_000` ms.
///
/// Taking the sign from the parsed hours instead would lose it when the hours
/// are zero: `-0:30` would come out as thirty minutes ahead (`-1_800_000`).
/// This parser yields `+1_800_000` for it.
pub fn parse_time_zone(value: &str) -> Result<TimeZoneOffset, TimeZoneError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TimeZoneError::Empty);
    }

    let (hours, minutes) = value
        .split_once(':')
        .ok_or_else(|| TimeZoneError::MissingSeparator(value.to_string()))?;

    let (sign, hours_digits) = match hours.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, hours.strip_prefix('+').unwrap_or(hours)),
    };

    let hours_value: u32 = hours_digits
        .parse()
        .ok()
        .filter(|h| *h <= MAX_OFFSET_HOURS)
        .ok_or_else(|| TimeZoneError::InvalidHours(hours.to_string()))?;
    let minutes_value: u32 = minutes
        .parse()
        .ok()
        .filter(|m| *m < 60)
        .ok_or_else(|| TimeZoneError::InvalidMinutes(minutes.to_string()))?;

    let total_minutes = sign * (i64::from(hours_value) * 60 + i64::from(minutes_value));
    Ok(TimeZoneOffset(-total_minutes * MILLIS_PER_MINUTE))
}

/// Parse a `timeOfRead` value as a UTC instant, in epoch milliseconds.
pub fn parse_utc_millis(value: &str) -> Result<i64, TimeOfReadError> {
    NaiveDateTime::parse_from_str(value.trim(), TIME_OF_READ_FORMAT)
        .map(|naive| naive.and_utc().timestamp_millis())
        .map_err(|source| TimeOfReadError {
            value: value.to_string(),
            source,
        })
}
