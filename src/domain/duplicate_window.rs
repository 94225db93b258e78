//! Duplicate protection interval for open registrations.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Default duplicate protection interval in seconds.
pub const DEFAULT_DUPLICATE_PROTECTION_SECS: u64 = 300;

/// Time window within which a prior open registration suppresses a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateWindowPolicy {
    interval: Duration,
}

impl DuplicateWindowPolicy {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a registration made at `previous` still suppresses one at `now`.
    ///
    /// The window is half-open: a registration exactly `interval` old no
    /// longer suppresses. A window ending past the representable date range
    /// never expires.
    pub fn suppresses(&self, previous: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let Ok(window) = TimeDelta::from_std(self.interval) else {
            return true;
        };

        previous
            .checked_add_signed(window)
            .is_none_or(|end| now < end)
    }
}

impl Default for DuplicateWindowPolicy {
    fn default() -> Self {
        Self::from_secs(DEFAULT_DUPLICATE_PROTECTION_SECS)
    }
}
