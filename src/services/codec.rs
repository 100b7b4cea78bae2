//! Codec utilities: canonical timestamps and base64url normalization.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::{DateTime, FixedOffset, Local, TimeZone};

use crate::infra::error::{EsiaError, EsiaResult};

/// Timestamp layout the provider reconstructs when checking a client secret.
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M:%S %z";

/// Make standard base64 text URL-safe the way the provider expects.
///
/// Only the first `=` is removed, so two-byte padding leaves one `=` behind.
/// Existing secrets were produced this way and are accepted as such.
#[must_use]
pub fn url_safe(encoded: &str) -> String {
    encoded
        .trim()
        .replace('+', "-")
        .replace('/', "_")
        .replacen('=', "", 1)
}

/// Standard base64 followed by [`url_safe`].
#[must_use]
pub fn base64url_encode(bytes: &[u8]) -> String {
    url_safe(&STANDARD.encode(bytes))
}

/// Decode base64url text with or without padding. Standard-alphabet
/// characters are tolerated.
pub fn base64url_decode(text: &str) -> EsiaResult<Vec<u8>> {
    let normalized: String = text
        .trim()
        .chars()
        .filter(|c| *c != '=')
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| EsiaError::ValidationError(format!("Invalid base64url data: {e}")))
}

/// `YYYY.MM.DD HH:MM:SS ±HHMM` for any zone-aware instant.
#[must_use]
pub fn format_timestamp<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Current wall-clock time in the local zone.
#[must_use]
pub fn timestamp_now() -> String {
    format_timestamp(&Local::now())
}

/// Format a Unix-millisecond instant in a fixed zone offset.
pub fn timestamp_from_millis(millis: i64, offset: FixedOffset) -> EsiaResult<String> {
    let instant = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        EsiaError::ValidationError(format!("Timestamp {millis} ms is out of range"))
    })?;
    Ok(format_timestamp(&instant.with_timezone(&offset)))
}
