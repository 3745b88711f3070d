//! dvr-core
//!
//! Housekeeping core for a Live TV DVR: prunes scheduled-recording records
//! that are long past their scheduled end time.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, recording, retention, errors）
//! - **ports**: 抽象化レイヤー（RecordingStore, Clock, IdGenerator）
//! - **impls**: 実装（InMemoryRecordingStore）
//! - **app**: アプリケーションロジック（ScheduledProgramReaper, ReaperLoop）
//! - **config**: ReaperConfig（TOML）

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use self::app::{ReapReport, ReaperLoop, ScheduledProgramReaper};
pub use self::config::{ConfigError, ReaperConfig};
