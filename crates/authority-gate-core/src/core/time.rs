// crates/authority-gate-core/src/core/time.rs
// ============================================================================
// Module: Authority Gate Time Model
// Description: Canonical wall-clock timestamps for intents, verdicts, and records.
// Purpose: Provide explicit, replayable time values across governance records.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Authority Gate binds every intent, verdict, and witness record to an
//! explicit RFC 3339 timestamp. The core engine never reads wall-clock time
//! on its own; callers supply `now` at the pipeline boundary so that policy
//! evaluation and promotion checks stay deterministic under test.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Canonical timestamp used in governance records.
///
/// # Invariants
/// - Serializes as an RFC 3339 string; the canonical serialization is the
///   form that participates in content hashing.
/// - Core evaluation never reads the clock; [`Timestamp::now_utc`] is for
///   call-site boundaries (CLI, pipeline entry) only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(#[serde(with = "time::serde::rfc3339")] OffsetDateTime);

impl Timestamp {
    /// Captures the current wall-clock time in UTC.
    #[must_use]
    pub fn now_utc() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Wraps an explicit datetime value.
    #[must_use]
    pub const fn new(datetime: OffsetDateTime) -> Self {
        Self(datetime)
    }

    /// Parses an RFC 3339 timestamp string.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampParseError`] when the input is not valid RFC 3339.
    pub fn parse_rfc3339(input: &str) -> Result<Self, TimestampParseError> {
        OffsetDateTime::parse(input, &Rfc3339)
            .map(Self)
            .map_err(|err| TimestampParseError(err.to_string()))
    }

    /// Returns the elapsed duration since an earlier timestamp.
    ///
    /// Negative when `earlier` is in the future relative to `self`.
    #[must_use]
    pub fn since(self, earlier: Self) -> Duration {
        self.0 - earlier.0
    }

    /// Returns a timestamp shifted by the given duration.
    #[must_use]
    pub fn shifted(self, offset: Duration) -> Self {
        Self(self.0 + offset)
    }

    /// Returns the inner datetime value.
    #[must_use]
    pub const fn as_datetime(&self) -> OffsetDateTime {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.format(&Rfc3339) {
            Ok(formatted) => f.write_str(&formatted),
            Err(_) => Err(fmt::Error),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error raised when a timestamp string is not valid RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid rfc3339 timestamp: {0}")]
pub struct TimestampParseError(String);
