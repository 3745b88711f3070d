//! InMemoryRecordingStore - 開発・テスト用の RecordingStore
//!
//! # 実装詳細
//! - BTreeMap<ScheduleId, ScheduledRecording> で live / deleted を別々に保持
//! - std::sync::Mutex で排他制御（呼び出しはすべて blocking）

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::{RecordingState, ScheduleId, ScheduledRecording, StoreError};
use crate::ports::RecordingStore;

#[derive(Debug, Default)]
struct StoreState {
    scheduled: BTreeMap<ScheduleId, ScheduledRecording>,
    deleted: BTreeMap<ScheduleId, ScheduledRecording>,
}

/// Serializable contents of an [`InMemoryRecordingStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub scheduled: Vec<ScheduledRecording>,
    #[serde(default)]
    pub deleted: Vec<ScheduledRecording>,
}

/// In-memory mapping from id to record.
///
/// Records come back ordered by id, which for ULIDs is creation order.
#[derive(Debug, Default)]
pub struct InMemoryRecordingStore {
    state: Mutex<StoreState>,
}

impl InMemoryRecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot of live and deleted schedules.
    pub fn from_snapshot(
        scheduled: impl IntoIterator<Item = ScheduledRecording>,
        deleted: impl IntoIterator<Item = ScheduledRecording>,
    ) -> Result<Self, StoreError> {
        let store = Self::new();
        for recording in scheduled {
            store.add_scheduled_recording(recording)?;
        }
        {
            let mut state = store.lock()?;
            for recording in deleted {
                let id = recording.id();
                if state.scheduled.contains_key(&id) || state.deleted.contains_key(&id) {
                    return Err(StoreError::Duplicate(id));
                }
                state
                    .deleted
                    .insert(id, recording.with_state(RecordingState::Deleted));
            }
        }
        Ok(store)
    }

    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        let state = self.lock()?;
        Ok(StoreSnapshot {
            scheduled: state.scheduled.values().cloned().collect(),
            deleted: state.deleted.values().cloned().collect(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("store lock poisoned: {e}")))
    }

    pub fn add_scheduled_recording(
        &self,
        recording: ScheduledRecording,
    ) -> Result<ScheduledRecording, StoreError> {
        let mut state = self.lock()?;
        let id = recording.id();
        if state.scheduled.contains_key(&id) || state.deleted.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        state.scheduled.insert(id, recording.clone());
        Ok(recording)
    }

    /// Move a live schedule into the deleted list, keeping it until reaped.
    pub fn mark_deleted(&self, id: ScheduleId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let recording = state
            .scheduled
            .remove(&id)
            .ok_or(StoreError::NotFound(id))?;
        state
            .deleted
            .insert(id, recording.with_state(RecordingState::Deleted));
        Ok(())
    }

    pub fn get(&self, id: ScheduleId) -> Result<Option<ScheduledRecording>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .scheduled
            .get(&id)
            .or_else(|| state.deleted.get(&id))
            .cloned())
    }

    /// Number of live schedules.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.scheduled.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl RecordingStore for InMemoryRecordingStore {
    fn all_scheduled_recordings(&self) -> Result<Vec<ScheduledRecording>, StoreError> {
        Ok(self.lock()?.scheduled.values().cloned().collect())
    }

    fn deleted_schedules(&self) -> Result<Vec<ScheduledRecording>, StoreError> {
        Ok(self.lock()?.deleted.values().cloned().collect())
    }

    fn delete(&self, id: ScheduleId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.scheduled.remove(&id).is_some() || state.deleted.remove(&id).is_some() {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }
}
