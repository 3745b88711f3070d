//! RecordingStore port - scheduled recording の保存先
//!
//! reaper が必要とするのは「全件取得」と「1 件削除」だけです。
//! 本番の永続化アダプタは別クレートの責務で、ここではインターフェースのみ定義します。

use std::sync::Arc;

use crate::domain::{ScheduleId, ScheduledRecording, StoreError};

/// Blocking access to scheduled-recording records.
///
/// Implementations own their concurrency discipline; callers hold no lock
/// across calls.
#[cfg_attr(test, mockall::automock)]
pub trait RecordingStore: Send + Sync {
    /// All live scheduled recordings, in the store's order.
    fn all_scheduled_recordings(&self) -> Result<Vec<ScheduledRecording>, StoreError>;

    /// Schedules the user removed that the store still keeps around.
    fn deleted_schedules(&self) -> Result<Vec<ScheduledRecording>, StoreError> {
        Ok(Vec::new())
    }

    /// Remove a record, whether live or deleted.
    fn delete(&self, id: ScheduleId) -> Result<(), StoreError>;
}

impl<S: RecordingStore + ?Sized> RecordingStore for Arc<S> {
    fn all_scheduled_recordings(&self) -> Result<Vec<ScheduledRecording>, StoreError> {
        (**self).all_scheduled_recordings()
    }

    fn deleted_schedules(&self) -> Result<Vec<ScheduledRecording>, StoreError> {
        (**self).deleted_schedules()
    }

    fn delete(&self, id: ScheduleId) -> Result<(), StoreError> {
        (**self).delete(id)
    }
}
