//! Timestamp type and clock abstraction.
//!
//! Timestamps are Unix epoch seconds (UTC). Engines never read the system
//! clock themselves; callers pass `now` in, usually from a [`Clock`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds in one calendar day.
pub const SECS_PER_DAY: u64 = 86_400;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    ///
    /// A clock set before 1970 reads as the epoch.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// This timestamp moved forward by whole days.
    pub fn plus_days(&self, days: u32) -> Self {
        Self(self.0.saturating_add(days as u64 * SECS_PER_DAY))
    }

    /// This timestamp moved back by whole days (saturating at the epoch).
    pub fn minus_days(&self, days: u32) -> Self {
        Self(self.0.saturating_sub(days as u64 * SECS_PER_DAY))
    }

    /// This timestamp moved back by whole hours (saturating at the epoch).
    pub fn minus_hours(&self, hours: u32) -> Self {
        Self(self.0.saturating_sub(hours as u64 * 3_600))
    }

    /// Whole days `now` lies past this timestamp, rounded up.
    ///
    /// Zero when `now` is at or before this timestamp.
    pub fn days_overdue(&self, now: Timestamp) -> u32 {
        let late = self.elapsed_since(now);
        late.div_ceil(SECS_PER_DAY).min(u32::MAX as u64) as u32
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The real wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
