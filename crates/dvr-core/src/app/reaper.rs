//! ScheduledProgramReaper - 期限切れ scheduled recording の削除
//!
//! # フロー
//! 1. Clock から now を取得し cutoff = now - retention を計算
//! 2. RecordingStore から全件（+ deleted schedules）を取得
//! 3. `now - end_time > retention` のものを 1 件ずつ delete
//!
//! 削除は 1 件ずつ独立していて、途中で失敗しても残りの削除は試みます。
//! 途中で中断されても store には「stale なものが減った」状態しか残りません。

use chrono::{DateTime, Utc};

use crate::config::ReaperConfig;
use crate::domain::{ReapError, RetentionWindow, ScheduleId, ScheduledRecording, StoreError};
use crate::ports::{Clock, RecordingStore};

/// Results from a single sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReapReport {
    /// Records that ended before this instant were expired.
    pub cutoff: DateTime<Utc>,
    /// Number of records inspected.
    pub scanned: usize,
    /// Records removed by this sweep.
    pub deleted: Vec<ScheduleId>,
}

impl ReapReport {
    pub fn has_deletions(&self) -> bool {
        !self.deleted.is_empty()
    }
}

/// Deletes scheduled recordings whose end time is more than the retention
/// window in the past, whatever their lifecycle state.
pub struct ScheduledProgramReaper<S, C> {
    store: S,
    clock: C,
    retention: RetentionWindow,
    include_deleted_schedules: bool,
}

impl<S: RecordingStore, C: Clock> ScheduledProgramReaper<S, C> {
    /// Reaper with the default retention window.
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            retention: RetentionWindow::default(),
            include_deleted_schedules: true,
        }
    }

    pub fn from_config(store: S, clock: C, config: &ReaperConfig) -> Self {
        Self::new(store, clock)
            .with_retention(config.retention())
            .with_deleted_schedules(config.include_deleted_schedules)
    }

    pub fn with_retention(mut self, retention: RetentionWindow) -> Self {
        self.retention = retention;
        self
    }

    /// Whether the sweep also covers schedules the user already deleted.
    pub fn with_deleted_schedules(mut self, include: bool) -> Self {
        self.include_deleted_schedules = include;
        self
    }

    pub fn retention(&self) -> RetentionWindow {
        self.retention
    }

    /// Run one blocking sweep over the store.
    pub fn run(&self) -> Result<ReapReport, ReapError> {
        let now = self.clock.now();
        let cutoff = self
            .retention
            .cutoff(now)
            .ok_or(ReapError::CutoffOutOfRange {
                retention_days: self.retention.as_days(),
            })?;

        let mut candidates = self.store.all_scheduled_recordings()?;
        if self.include_deleted_schedules {
            candidates.extend(self.store.deleted_schedules()?);
        }
        let scanned = candidates.len();

        let expired: Vec<ScheduledRecording> = candidates
            .into_iter()
            .filter(|r| self.retention.is_expired(r.end_time(), now))
            .collect();

        let mut deleted = Vec::with_capacity(expired.len());
        let mut failures = Vec::new();
        for recording in expired {
            let id = recording.id();
            match self.store.delete(id) {
                Ok(()) => {
                    tracing::debug!(
                        schedule_id = %id,
                        channel_id = recording.channel_id(),
                        end_time = %recording.end_time(),
                        state = %recording.state(),
                        "Deleted expired scheduled recording"
                    );
                    deleted.push(id);
                }
                // Already gone (e.g. removed by the user mid-sweep).
                Err(StoreError::NotFound(_)) => {
                    tracing::debug!(schedule_id = %id, "Expired scheduled recording already removed");
                    deleted.push(id);
                }
                Err(e) => {
                    tracing::warn!(
                        schedule_id = %id,
                        error = %e,
                        "Failed to delete expired scheduled recording"
                    );
                    failures.push((id, e));
                }
            }
        }

        if !failures.is_empty() {
            return Err(ReapError::Incomplete { deleted, failures });
        }

        let report = ReapReport {
            cutoff,
            scanned,
            deleted,
        };
        if report.has_deletions() {
            tracing::info!(
                cutoff = %report.cutoff,
                scanned = report.scanned,
                deleted = report.deleted.len(),
                retention_days = self.retention.as_days(),
                "Scheduled recording reaper run complete"
            );
        } else {
            tracing::debug!(
                cutoff = %report.cutoff,
                scanned = report.scanned,
                "Scheduled recording reaper run complete, nothing to delete"
            );
        }
        Ok(report)
    }
}
