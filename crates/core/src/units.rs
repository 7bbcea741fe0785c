//! Parsers for the human-readable duration and size strings used in sweep settings.
//!
//! Both parsers are total: malformed input logs an error and falls back to the
//! documented default instead of failing, so a bad settings edit can never stop
//! the sweeper.

use tracing::error;

/// Fallback when a duration string cannot be parsed: 2 hours.
pub const DEFAULT_MAX_DOWNLOAD_TIME_SECS: u64 = 7_200;

/// Fallback when a size string cannot be parsed: 25 GiB.
pub const DEFAULT_IGNORE_ABOVE_SIZE_BYTES: u64 = 26_843_545_600;

/// Parses a duration like `"2h"`, `"7d"` or `"30m"` into seconds.
///
/// Supported units are `d`, `h` and `m` (case-insensitive). An empty string is
/// treated as "use the default" without logging; anything else that fails to
/// parse logs an error and returns [`DEFAULT_MAX_DOWNLOAD_TIME_SECS`]. Values
/// too large to hold in seconds saturate to `u64::MAX`.
pub fn parse_duration(input: &str) -> u64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return DEFAULT_MAX_DOWNLOAD_TIME_SECS;
    }

    let Some(unit) = trimmed.chars().next_back() else {
        return DEFAULT_MAX_DOWNLOAD_TIME_SECS;
    };
    let value_part = &trimmed[..trimmed.len() - unit.len_utf8()];

    let Ok(value) = value_part.trim().parse::<u64>() else {
        error!(
            "Invalid duration value '{}', using default of 2 hours",
            input
        );
        return DEFAULT_MAX_DOWNLOAD_TIME_SECS;
    };

    match unit.to_ascii_lowercase() {
        'd' => value.saturating_mul(86_400),
        'h' => value.saturating_mul(3_600),
        'm' => value.saturating_mul(60),
        _ => {
            error!(
                "Unknown duration unit in '{}', using default of 2 hours",
                input
            );
            DEFAULT_MAX_DOWNLOAD_TIME_SECS
        }
    }
}

/// Parses a size like `"25GB"`, `"1.5GB"` or `"700 MB"` into bytes.
///
/// Units are binary multiples (`1KB` = 1024 bytes) and matched
/// case-insensitively. The numeric part may be fractional; the result is
/// truncated to whole bytes. Malformed input logs an error and returns
/// [`DEFAULT_IGNORE_ABOVE_SIZE_BYTES`].
pub fn parse_size(input: &str) -> u64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return DEFAULT_IGNORE_ABOVE_SIZE_BYTES;
    }

    // The unit is the trailing run of letters, the value everything before it.
    let Some(split) = trimmed
        .char_indices()
        .rev()
        .find(|(_, c)| !c.is_alphabetic())
        .map(|(i, c)| i + c.len_utf8())
    else {
        error!("Invalid size string '{}', using default of 25GB", input);
        return DEFAULT_IGNORE_ABOVE_SIZE_BYTES;
    };
    let (value_part, unit_part) = trimmed.split_at(split);

    let Ok(value) = value_part.trim().parse::<f64>() else {
        error!("Invalid size value '{}', using default of 25GB", input);
        return DEFAULT_IGNORE_ABOVE_SIZE_BYTES;
    };

    let multiplier: u64 = match unit_part.to_ascii_uppercase().as_str() {
        "B" => 1,
        "KB" => 1 << 10,
        "MB" => 1 << 20,
        "GB" => 1 << 30,
        "TB" => 1 << 40,
        _ => {
            error!("Unknown size unit in '{}', using default of 25GB", input);
            return DEFAULT_IGNORE_ABOVE_SIZE_BYTES;
        }
    };

    (value * multiplier as f64) as u64
}
