//! Domain model (ids, scheduled recordings, retention, errors).

pub mod errors;
pub mod ids;
pub mod recording;
pub mod retention;

pub use self::errors::{DvrError, ReapError, StoreError};
pub use self::ids::{Id, IdMarker, ScheduleId};
pub use self::recording::{RecordingState, ScheduledRecording};
pub use self::retention::RetentionWindow;
