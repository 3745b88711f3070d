//! Errors - エラー型
//!
//! - StoreError: RecordingStore 実装が返すエラー
//! - DvrError: ドメインモデルの不変条件違反（end_time < start_time など）
//! - ReapError: reaper の 1 回の sweep が失敗したときのエラー

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::ids::ScheduleId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("recording store unavailable: {0}")]
    Unavailable(String),

    #[error("scheduled recording {0} not found")]
    NotFound(ScheduleId),

    #[error("scheduled recording {0} already exists")]
    Duplicate(ScheduleId),

    #[error("failed to delete scheduled recording {id}: {reason}")]
    DeleteFailed { id: ScheduleId, reason: String },
}

#[derive(Debug, Error)]
pub enum DvrError {
    #[error("end time {end} is before start time {start}")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

#[derive(Debug, Error)]
pub enum ReapError {
    /// Listing the store failed; nothing was deleted.
    #[error("failed to read scheduled recordings: {0}")]
    Store(#[from] StoreError),

    /// The retention window reaches past the earliest representable time.
    #[error("retention window of {retention_days} days is out of range")]
    CutoffOutOfRange { retention_days: u32 },

    /// Every expired record was attempted, but some deletions failed.
    #[error("{} expired recordings could not be deleted", .failures.len())]
    Incomplete {
        deleted: Vec<ScheduleId>,
        failures: Vec<(ScheduleId, StoreError)>,
    },
}
