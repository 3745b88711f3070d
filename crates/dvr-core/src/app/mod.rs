//! App - アプリケーション層
//!
//! ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **ScheduledProgramReaper**: 期限切れ scheduled recording の 1 回分の sweep
//! - **ReaperLoop**: reaper の定期実行（tokio）

pub mod reaper;
pub mod reaper_loop;

pub use self::reaper::{ReapReport, ScheduledProgramReaper};
pub use self::reaper_loop::ReaperLoop;
