//! Human-readable durations for command-line options.

use std::time::Duration;

/// Parse a duration such as `500ms`, `3s`, `1m` or `2h`.
///
/// A bare number is read as seconds.
///
/// # Examples
/// ```
/// use csl_decoder::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
/// assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
/// ```
pub fn parse_duration(src: &str) -> Result<Duration, String> {
    let src = src.trim();
    if src.is_empty() {
        return Err("empty duration string".to_string());
    }

    // "ms" must be tried before "m" and "s"
    let units: [(&str, fn(u64) -> Option<Duration>); 4] = [
        ("ms", |n| Some(Duration::from_millis(n))),
        ("h", |n| n.checked_mul(3600).map(Duration::from_secs)),
        ("m", |n| n.checked_mul(60).map(Duration::from_secs)),
        ("s", |n| Some(Duration::from_secs(n))),
    ];

    let (number, to_duration) = units
        .iter()
        .find_map(|(suffix, to_duration)| {
            src.strip_suffix(suffix)
                .map(|number| (number.trim(), *to_duration))
        })
        .unwrap_or((src, units[3].1));

    let count = number
        .parse::<u64>()
        .map_err(|_| format!("invalid duration: {src}"))?;
    to_duration(count).ok_or_else(|| format!("duration too large: {src}"))
}
