//! Datetime codec shared by the entity and the storage boundary.
//!
//! Timestamps are persisted as UTC strings so that lexical ordering matches
//! chronological ordering on every backend.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

use crate::error::DomainError;

/// Storage format for post timestamps (second precision).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage format for snapshot timestamps (microsecond precision).
pub const DATETIME_MICROS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Stored in place of an unset timestamp.
pub const NULL_DATETIME: &str = "0002-01-01 00:00:00";

/// Stored in `soft_deleted_at` for rows that are not deleted.
pub const MAX_DATETIME: &str = "9999-12-31 23:59:59";

/// Current instant truncated to whole seconds.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub fn format_datetime_micros(value: &DateTime<Utc>) -> String {
    value.format(DATETIME_MICROS_FORMAT).to_string()
}

/// Parse a stored timestamp. Accepts both second and sub-second precision.
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, DomainError> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| DomainError::Validation(format!("invalid datetime '{value}': {e}")))
}

/// Render an optional timestamp, substituting `sentinel` for `None`.
pub fn format_optional(value: Option<&DateTime<Utc>>, sentinel: &str) -> String {
    value
        .map(format_datetime)
        .unwrap_or_else(|| sentinel.to_string())
}

/// Parse an optional timestamp, mapping the sentinel (or blank) to `None`.
pub fn parse_optional(value: &str, sentinel: &str) -> Result<Option<DateTime<Utc>>, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == sentinel {
        return Ok(None);
    }
    parse_datetime(trimmed).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_and_parse() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let formatted = format_datetime(&ts);
        assert_eq!(formatted, "2026-01-15 10:00:00");
        assert_eq!(parse_datetime(&formatted).unwrap(), ts);
    }

    #[test]
    fn test_parse_accepts_micros() {
        let parsed = parse_datetime("2026-01-15 10:00:00.123456").unwrap();
        assert_eq!(parsed.timestamp_subsec_micros(), 123456);
    }

    #[test]
    fn test_sentinels_map_to_none() {
        assert_eq!(parse_optional(MAX_DATETIME, MAX_DATETIME).unwrap(), None);
        assert_eq!(parse_optional("", NULL_DATETIME).unwrap(), None);
        assert_eq!(format_optional(None, MAX_DATETIME), MAX_DATETIME);
    }

    #[test]
    fn test_invalid_datetime_is_rejected() {
        assert!(parse_datetime("2026-01-15 08:08:36 +0000 +0000").is_err());
    }
}
