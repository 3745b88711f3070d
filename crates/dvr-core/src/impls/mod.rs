//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryRecordingStore**: id → record のインメモリ保存先
//!
//! 永続化された保存先のアダプタは別クレートに配置します。

pub mod inmem_store;

pub use self::inmem_store::{InMemoryRecordingStore, StoreSnapshot};
