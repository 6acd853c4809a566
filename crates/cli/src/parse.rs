//! Command-line time parsing.

use anyhow::{anyhow, bail, Context, Result};
use bagmerge_core::Timestamp;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Parse an absolute instant into nanoseconds since the Unix epoch.
///
/// RFC 3339 is tried first; a bare `YYYY-MM-DD HH:MM:SS` (with a space or a
/// `T` separator) is also accepted and read as UTC.
pub fn parse_instant(text: &str) -> Result<Timestamp> {
    let utc: DateTime<Utc> = if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        parsed.with_timezone(&Utc)
    } else {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
            .with_context(|| format!("unrecognized time {:?} (expected RFC 3339)", text))?
            .and_utc()
    };

    let nanos = utc
        .timestamp_nanos_opt()
        .ok_or_else(|| anyhow!("time {:?} is out of range", text))?;
    if nanos < 0 {
        bail!("time {:?} predates the Unix epoch", text);
    }
    Ok(nanos as Timestamp)
}

/// Render nanoseconds since the epoch as UTC RFC 3339.
pub fn format_instant(t: Timestamp) -> String {
    match DateTime::<Utc>::from_timestamp((t / 1_000_000_000) as i64, (t % 1_000_000_000) as u32) {
        Some(utc) => utc.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => format!("{} ns", t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339_utc() {
        let t = parse_instant("1970-01-01T00:00:01Z").unwrap();
        assert_eq!(t, 1_000_000_000);
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let t = parse_instant("1970-01-01T01:00:01+01:00").unwrap();
        assert_eq!(t, 1_000_000_000);
    }

    #[test]
    fn test_parse_naive_assumes_utc() {
        let spaced = parse_instant("1970-01-01 00:00:02").unwrap();
        let tee = parse_instant("1970-01-01T00:00:02").unwrap();
        assert_eq!(spaced, 2_000_000_000);
        assert_eq!(tee, 2_000_000_000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_instant("yesterday").is_err());
    }

    #[test]
    fn test_parse_rejects_pre_epoch() {
        assert!(parse_instant("1969-12-31T23:59:59Z").is_err());
    }

    #[test]
    fn test_format_round_trips() {
        let t = parse_instant("2026-03-04T05:06:07.250Z").unwrap();
        assert_eq!(format_instant(t), "2026-03-04T05:06:07.250Z");
    }
}
