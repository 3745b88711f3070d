//! Ports - 抽象化レイヤー
//!
//! reaper が依存する外部コラボレータ（保存先・時計・ID 生成）を trait として定義します。
//! 実装の詳細は `impls` や別クレートに置きます。

pub mod clock;
pub mod id_generator;
pub mod recording_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::recording_store::RecordingStore;
