//! Scheduled recording record.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::DvrError;
use super::ids::ScheduleId;

/// Lifecycle state of a scheduled recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    #[default]
    NotStarted,
    InProgress,
    Finished,
    Failed,
    Clipped,
    /// Removed by the user but still kept by the store.
    Deleted,
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            RecordingState::NotStarted => "not_started",
            RecordingState::InProgress => "in_progress",
            RecordingState::Finished => "finished",
            RecordingState::Failed => "failed",
            RecordingState::Clipped => "clipped",
            RecordingState::Deleted => "deleted",
        };
        write!(f, "{}", state)
    }
}

/// A planned (or past) DVR capture of one channel over a time range.
///
/// `end_time >= start_time` always holds; both `new` and deserialization
/// reject records that violate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawScheduledRecording")]
pub struct ScheduledRecording {
    id: ScheduleId,
    input_id: String,
    channel_id: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    state: RecordingState,
}

impl ScheduledRecording {
    pub fn new(
        id: ScheduleId,
        input_id: impl Into<String>,
        channel_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Self, DvrError> {
        if end_time < start_time {
            return Err(DvrError::InvalidTimeRange {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            id,
            input_id: input_id.into(),
            channel_id,
            start_time,
            end_time,
            state: RecordingState::NotStarted,
        })
    }

    /// Copy of this record with a different state.
    pub fn with_state(mut self, state: RecordingState) -> Self {
        self.state = state;
        self
    }

    pub fn id(&self) -> ScheduleId {
        self.id
    }

    pub fn input_id(&self) -> &str {
        &self.input_id
    }

    pub fn channel_id(&self) -> i64 {
        self.channel_id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn duration(&self) -> TimeDelta {
        self.end_time - self.start_time
    }

    /// How long ago the recording was scheduled to end. Negative while the
    /// end time is still in the future.
    pub fn age_at(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.end_time
    }
}

#[derive(Deserialize)]
struct RawScheduledRecording {
    id: ScheduleId,
    input_id: String,
    channel_id: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    #[serde(default)]
    state: RecordingState,
}

impl TryFrom<RawScheduledRecording> for ScheduledRecording {
    type Error = DvrError;

    fn try_from(raw: RawScheduledRecording) -> Result<Self, Self::Error> {
        ScheduledRecording::new(
            raw.id,
            raw.input_id,
            raw.channel_id,
            raw.start_time,
            raw.end_time,
        )
        .map(|recording| recording.with_state(raw.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ulid::Ulid;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap()
    }

    #[test]
    fn new_recording_is_not_started() {
        let id = ScheduleId::from_ulid(Ulid::new());
        let recording =
            ScheduledRecording::new(id, "input_id", 273, start(), start() + TimeDelta::hours(1))
                .unwrap();

        assert_eq!(recording.id(), id);
        assert_eq!(recording.input_id(), "input_id");
        assert_eq!(recording.channel_id(), 273);
        assert_eq!(recording.state(), RecordingState::NotStarted);
        assert_eq!(recording.duration(), TimeDelta::hours(1));
    }

    #[test]
    fn zero_length_recording_is_allowed() {
        let id = ScheduleId::from_ulid(Ulid::new());
        assert!(ScheduledRecording::new(id, "input_id", 1, start(), start()).is_ok());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let id = ScheduleId::from_ulid(Ulid::new());
        let err = ScheduledRecording::new(id, "input_id", 1, start(), start() - TimeDelta::seconds(1))
            .unwrap_err();

        assert!(matches!(err, DvrError::InvalidTimeRange { .. }));
    }

    #[test]
    fn age_is_measured_from_end_time() {
        let id = ScheduleId::from_ulid(Ulid::new());
        let end = start() + TimeDelta::hours(1);
        let recording = ScheduledRecording::new(id, "input_id", 1, start(), end).unwrap();

        assert_eq!(recording.age_at(end + TimeDelta::days(3)), TimeDelta::days(3));
        assert!(recording.age_at(start()) < TimeDelta::zero());
    }

    #[test]
    fn with_state_keeps_other_fields() {
        let id = ScheduleId::from_ulid(Ulid::new());
        let recording =
            ScheduledRecording::new(id, "input_id", 7, start(), start() + TimeDelta::hours(1))
                .unwrap();
        let finished = recording.clone().with_state(RecordingState::Finished);

        assert_eq!(finished.state(), RecordingState::Finished);
        assert_eq!(finished.id(), recording.id());
        assert_eq!(finished.end_time(), recording.end_time());
    }

    #[test]
    fn deserialization_enforces_time_range() {
        let id = ScheduleId::from_ulid(Ulid::new());
        let json = serde_json::json!({
            "id": id,
            "input_id": "input_id",
            "channel_id": 1,
            "start_time": "2024-03-01T21:00:00Z",
            "end_time": "2024-03-01T20:00:00Z",
        });

        assert!(serde_json::from_value::<ScheduledRecording>(json).is_err());
    }

    #[test]
    fn deserialization_defaults_state_to_not_started() {
        let id = ScheduleId::from_ulid(Ulid::new());
        let json = serde_json::json!({
            "id": id,
            "input_id": "input_id",
            "channel_id": 1,
            "start_time": "2024-03-01T20:00:00Z",
            "end_time": "2024-03-01T21:00:00Z",
        });

        let recording: ScheduledRecording = serde_json::from_value(json).unwrap();
        assert_eq!(recording.state(), RecordingState::NotStarted);
    }

    #[test]
    fn state_serializes_in_snake_case() {
        let json = serde_json::to_string(&RecordingState::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(RecordingState::InProgress.to_string(), "in_progress");
    }
}
