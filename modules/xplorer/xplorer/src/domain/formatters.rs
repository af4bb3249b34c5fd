//! Display formatting for byte counts, timestamps, durations and counters.
//!
//! Everything here is pure; "now" is injectable for the time-relative helpers.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const BYTE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Format a byte count with 1024-based units, e.g. `1536` → `"1.5 KB"`.
///
/// Picks the largest unit (up to PB) in which the value is at least 1 and
/// rounds to two decimals, dropping trailing zeros. Zero is `"0 B"`.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_owned();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{} {}", trim_decimals(value), BYTE_UNITS[unit])
}

/// Alias kept for storage columns.
#[must_use]
pub fn format_storage(bytes: u64) -> String {
    format_bytes(bytes)
}

fn trim_decimals(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_owned()
}

/// Describe how long ago `timestamp` was, relative to the current time.
#[must_use]
pub fn format_relative_time(timestamp: Option<OffsetDateTime>) -> String {
    format_relative_time_at(timestamp, OffsetDateTime::now_utc())
}

/// Describe how long before `now` the `timestamp` was.
///
/// `"Just now"` under a minute (including timestamps in the future), then
/// whole minutes, hours and days. `None` is `"Unknown"`.
#[must_use]
pub fn format_relative_time_at(timestamp: Option<OffsetDateTime>, now: OffsetDateTime) -> String {
    let Some(timestamp) = timestamp else {
        return "Unknown".to_owned();
    };

    let seconds = (now - timestamp).whole_seconds();
    if seconds < SECONDS_PER_MINUTE {
        return "Just now".to_owned();
    }

    let minutes = seconds.div_euclid(SECONDS_PER_MINUTE);
    if minutes < 60 {
        return format!("{minutes} {} ago", pluralize("min", minutes));
    }

    let hours = minutes.div_euclid(60);
    if hours < 24 {
        return format!("{hours} {} ago", pluralize("hour", hours));
    }

    let days = hours.div_euclid(24);
    format!("{days} {} ago", pluralize("day", days))
}

fn pluralize(unit: &str, count: i64) -> String {
    if count > 1 {
        format!("{unit}s")
    } else {
        unit.to_owned()
    }
}

/// Format an uptime as `"2d 3h 15m"`, leaving out zero-valued units.
///
/// Non-positive input, or anything under a minute, is `"< 1m"`.
#[must_use]
pub fn format_uptime(seconds: i64) -> String {
    if seconds <= 0 {
        return "< 1m".to_owned();
    }

    let days = seconds.div_euclid(SECONDS_PER_DAY);
    let hours = seconds.rem_euclid(SECONDS_PER_DAY).div_euclid(SECONDS_PER_HOUR);
    let minutes = seconds.rem_euclid(SECONDS_PER_HOUR).div_euclid(SECONDS_PER_MINUTE);

    let parts: Vec<String> = [(days, 'd'), (hours, 'h'), (minutes, 'm')]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, suffix)| format!("{value}{suffix}"))
        .collect();

    if parts.is_empty() {
        "< 1m".to_owned()
    } else {
        parts.join(" ")
    }
}

/// Group thousands with commas, en-US style. `None` is `"0"`.
#[must_use]
pub fn format_number(value: Option<u64>) -> String {
    let Some(value) = value else {
        return "0".to_owned();
    };

    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Percentage of online nodes; zero for an empty network.
#[must_use]
pub fn network_health(online: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = online as f64 / total as f64;
    ratio * 100.0
}

/// Parse a timestamp as served by the telemetry API.
///
/// Accepts RFC 3339 and the space-separated `YYYY-MM-DD HH:MM:SS[.frac][+HH:MM]`
/// form. Values without an offset are taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = trimmed.replacen(' ', "T", 1);
    if let Ok(parsed) = OffsetDateTime::parse(&normalized, &Rfc3339) {
        return Some(parsed);
    }

    let naive = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    PrimitiveDateTime::parse(&normalized, naive)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}
