//! Current time tool.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde_json::{json, Value};

use super::Tool;

pub struct CurrentTime;

#[async_trait]
impl Tool for CurrentTime {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Get the current date and time as an RFC 3339 timestamp. Optionally pass a UTC offset such as '+08:00'."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "timezone": {
                    "type": "string",
                    "description": "UTC offset like '+08:00' or '-05:30'. Defaults to UTC."
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        format_time_at(Utc::now(), args["timezone"].as_str())
    }
}

/// Render `now` in the requested offset.
pub fn format_time_at(now: DateTime<Utc>, timezone: Option<&str>) -> anyhow::Result<String> {
    let offset = match timezone.map(str::trim) {
        None | Some("") | Some("UTC") | Some("utc") | Some("Z") => {
            return Ok(now.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        Some(tz) => parse_offset(tz)?,
    };

    Ok(now
        .with_timezone(&offset)
        .to_rfc3339_opts(SecondsFormat::Secs, false))
}

fn parse_offset(tz: &str) -> anyhow::Result<FixedOffset> {
    let invalid = || anyhow::anyhow!("Invalid timezone offset '{}', expected e.g. +08:00", tz);

    let (sign, rest) = match tz.as_bytes().first() {
        Some(b'+') => (1, &tz[1..]),
        Some(b'-') => (-1, &tz[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn defaults_to_utc() {
        assert_eq!(format_time_at(fixed_now(), None).unwrap(), "2025-03-01T12:30:00Z");
    }

    #[test]
    fn applies_offset() {
        assert_eq!(
            format_time_at(fixed_now(), Some("+08:00")).unwrap(),
            "2025-03-01T20:30:00+08:00"
        );
        assert_eq!(
            format_time_at(fixed_now(), Some("-05:30")).unwrap(),
            "2025-03-01T07:00:00-05:30"
        );
    }

    #[test]
    fn rejects_bad_offsets() {
        assert!(format_time_at(fixed_now(), Some("Mars/Olympus")).is_err());
        assert!(format_time_at(fixed_now(), Some("+25:00")).is_err());
        assert!(format_time_at(fixed_now(), Some("+01:75")).is_err());
    }
}
