use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%#z";

/// Postgres prints timestamps as `2024-01-02 03:04:05`; swap the separator for `T`.
pub(crate) fn fix_iso8601(text: &str) -> String {
    if text.len() > 10 && text.as_bytes()[10] == b' ' {
        let mut fixed = String::with_capacity(text.len());
        fixed.push_str(&text[..10]);
        fixed.push('T');
        fixed.push_str(&text[11..]);
        fixed
    } else {
        text.to_string()
    }
}

pub(crate) fn parse_date(text: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| format!("invalid date '{text}': {e}"))
}

pub(crate) fn parse_time(text: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(text, TIME_FORMAT).map_err(|e| format!("invalid time '{text}': {e}"))
}

pub(crate) fn parse_local_date_time(text: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(&fix_iso8601(text), LOCAL_DATE_TIME_FORMAT)
        .map_err(|e| format!("invalid timestamp '{text}': {e}"))
}

pub(crate) fn parse_instant(text: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_str(&fix_iso8601(text), INSTANT_FORMAT)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamptz '{text}': {e}"))
}

/// Decode the `\x` hex output form of a bytea column.
pub(crate) fn parse_bytea_hex(raw: &[u8]) -> Result<Vec<u8>, String> {
    match raw {
        [b'\\', b'x', hex @ ..] => hex::decode(hex).map_err(|e| format!("invalid bytea hex: {e}")),
        _ => Err("bytea value is not in hex output format".to_string()),
    }
}
