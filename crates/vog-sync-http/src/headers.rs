use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::{CONTENT_LENGTH, HeaderMap, LAST_MODIFIED};
use vog_sync::RemoteMetadata;

/// Read `Last-Modified` and `Content-Length`. Malformed values count as unknown.
pub fn remote_metadata(headers: &HeaderMap) -> RemoteMetadata {
    let modified = headers
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_http_date);

    let size = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    RemoteMetadata { modified, size }
}

/// Parse the three date forms HTTP/1.1 allows: IMF-fixdate, RFC 850, asctime.
pub fn parse_http_date(value: &str) -> Option<SystemTime> {
    let value = value.trim();

    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(SystemTime::from(date.with_timezone(&Utc)));
    }

    ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| SystemTime::from(naive.and_utc()))
}
