//! Display Formatting
//!
//! Pure helpers that turn raw platform values into display strings:
//! XP amounts (bytes, decimal units), dates, audit ratios and the
//! Basic-auth credential encoding used at sign-in.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Date format used for axis labels and tooltips
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const KILO: f64 = 1_000.0;
const MEGA: f64 = 1_000_000.0;

/// Format an XP amount using decimal byte units.
///
/// - below 1 000: the rounded integer (`500` -> `"500"`)
/// - below 1 000 000: kilobytes with one decimal (`1500` -> `"1.5 kB"`)
/// - otherwise: megabytes with two decimals (`2_000_000` -> `"2.00 MB"`)
pub fn format_xp(amount: f64) -> String {
    let magnitude = amount.abs();
    if magnitude >= MEGA {
        format!("{:.2} MB", amount / MEGA)
    } else if magnitude >= KILO {
        format!("{:.1} kB", amount / KILO)
    } else {
        format!("{}", amount.round() as i64)
    }
}

/// Format a skill level (a percentage)
pub fn format_percent(value: f64) -> String {
    format!("{}%", value.round() as i64)
}

/// Format an audit ratio with one decimal
pub fn format_ratio(ratio: f64) -> String {
    format!("{:.1}", ratio)
}

/// Format a timestamp as a calendar date
pub fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(DATE_FORMAT).to_string()
}

/// Format a millisecond timestamp as a calendar date
pub fn format_timestamp_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| format_date(&dt))
        .unwrap_or_else(|| "-".to_string())
}

/// Encode `identifier:secret` for an `Authorization: Basic` header
pub fn encode_credentials(identifier: &str, secret: &str) -> String {
    BASE64.encode(format!("{}:{}", identifier, secret))
}

/// Decode a Basic credential back into its `identifier:secret` form
pub fn decode_credentials(encoded: &str) -> Result<String, FormatError> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| FormatError::Base64Decode(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| FormatError::Utf8(e.to_string()))
}

/// Errors from decoding encoded values
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Base64 decode error: {0}")]
    Base64Decode(String),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(String),
}
