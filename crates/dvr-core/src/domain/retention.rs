//! Retention policy for scheduled recordings.

use chrono::{DateTime, TimeDelta, Utc};

/// How long a scheduled recording is kept after its scheduled end time.
///
/// A record expires only once its age *strictly exceeds* the window; a record
/// whose end time is exactly one window ago is still retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    days: u32,
}

impl RetentionWindow {
    pub const DEFAULT_DAYS: u32 = 2;
    /// Largest window accepted from configuration (100 years).
    pub const MAX_DAYS: u32 = 36_500;

    pub const fn days(days: u32) -> Self {
        Self { days }
    }

    pub fn as_days(&self) -> u32 {
        self.days
    }

    pub fn as_duration(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.days))
    }

    /// Records that ended before this instant are expired.
    ///
    /// `None` when the window reaches past the earliest representable time.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_sub_signed(self.as_duration())
    }

    pub fn is_expired(&self, end_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - end_time > self.as_duration()
    }
}

impl Default for RetentionWindow {
    fn default() -> Self {
        Self::days(Self::DEFAULT_DAYS)
    }
}
