//! SQLite helper utilities for type conversion
//!
//! SQLite has no native timestamp or boolean types. Timestamps are stored as
//! fixed-width RFC 3339 text so that text ordering, `MAX()` and equality all
//! behave chronologically; booleans are stored as 0/1 integers.

use anyhow::{Result, anyhow};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

// ============================================================================
// Timestamp Helpers (stored as RFC 3339 TEXT in SQLite)
// ============================================================================

/// Current UTC time, truncated to the precision we persist.
///
/// Truncating up front means a value handed back to a caller compares equal
/// to what a later read of the same row returns.
#[inline]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Convert a chrono DateTime to its stored form, e.g. `2024-05-01T08:30:00.000000Z`
#[inline]
pub fn datetime_to_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp to DateTime.
///
/// Only RFC 3339 is accepted. SQLite's own `datetime()` text
/// (`YYYY-MM-DD HH:MM:SS`) sorts before RFC 3339 text of the same instant,
/// so such rows would break `MAX()` and the check-out constraint.
#[inline]
pub fn str_to_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("Invalid datetime '{}': {}", s, e))
}

/// Parse an optional stored timestamp
#[inline]
pub fn str_to_datetime_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(str_to_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Map a conversion failure into the error type `FromRow` implementations return
pub fn decode_err(e: anyhow::Error) -> sqlx::Error {
    sqlx::Error::Decode(e.into())
}

// ============================================================================
// Boolean Helpers (SQLite uses 0/1 integers)
// ============================================================================

/// Convert bool to SQLite integer (0 or 1)
#[inline]
pub fn bool_to_int(b: bool) -> i32 {
    if b { 1 } else { 0 }
}

/// Convert SQLite integer to bool
#[inline]
pub fn int_to_bool(i: i32) -> bool {
    i != 0
}
