//! ReaperLoop - reaper の定期実行
//!
//! # フロー
//! 1. interval ごとに（初回は即座に）ScheduledProgramReaper::run() を呼ぶ
//! 2. run() は blocking なので spawn_blocking で実行
//! 3. shutdown シグナルが true になったら終了
//!
//! sweep の失敗はログに残すだけで、ループは止めません。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::reaper::ScheduledProgramReaper;
use crate::config::ReaperConfig;
use crate::ports::{Clock, RecordingStore};

pub struct ReaperLoop<S, C> {
    reaper: Arc<ScheduledProgramReaper<S, C>>,
    interval: Duration,
}

impl<S, C> ReaperLoop<S, C>
where
    S: RecordingStore + 'static,
    C: Clock + 'static,
{
    pub fn new(reaper: Arc<ScheduledProgramReaper<S, C>>, interval: Duration) -> Self {
        Self { reaper, interval }
    }

    pub fn from_config(reaper: Arc<ScheduledProgramReaper<S, C>>, config: &ReaperConfig) -> Self {
        Self::new(reaper, config.interval())
    }

    /// Sweep until `shutdown` becomes `true` (or its sender is dropped).
    ///
    /// Returns the number of sweeps attempted.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> u64 {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            retention_days = self.reaper.retention().as_days(),
            "Starting scheduled recording reaper loop"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sweeps = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            sweeps += 1;
            let reaper = self.reaper.clone();
            match tokio::task::spawn_blocking(move || reaper.run()).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Error running scheduled recording reaper");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Scheduled recording reaper task panicked");
                }
            }
        }

        tracing::info!(sweeps, "Scheduled recording reaper loop stopped");
        sweeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScheduleId, ScheduledRecording};
    use crate::impls::InMemoryRecordingStore;
    use crate::ports::FixedClock;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use ulid::Ulid;

    fn add_expired_recording(store: &InMemoryRecordingStore, now: DateTime<Utc>) {
        store
            .add_scheduled_recording(
                ScheduledRecording::new(
                    ScheduleId::from_ulid(Ulid::new()),
                    "input_id",
                    273,
                    now - TimeDelta::days(10),
                    now - TimeDelta::days(9),
                )
                .unwrap(),
            )
            .unwrap();
    }

    async fn wait_until_empty(store: &InMemoryRecordingStore) {
        while !store.is_empty().unwrap() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    fn reaper_with_expired_recording() -> (
        Arc<InMemoryRecordingStore>,
        Arc<ScheduledProgramReaper<Arc<InMemoryRecordingStore>, FixedClock>>,
    ) {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let store = Arc::new(InMemoryRecordingStore::new());
        add_expired_recording(&store, now);
        let reaper = Arc::new(ScheduledProgramReaper::new(
            store.clone(),
            FixedClock::new(now),
        ));
        (store, reaper)
    }

    #[tokio::test]
    async fn first_sweep_runs_immediately() {
        let (store, reaper) = reaper_with_expired_recording();
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(ReaperLoop::new(reaper, Duration::from_secs(3600)).run(rx));

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !store.is_empty().unwrap() {
            assert!(tokio::time::Instant::now() < deadline, "reaper never ran");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        tx.send(true).unwrap();
        let sweeps = handle.await.unwrap();
        assert_eq!(sweeps, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn next_sweep_waits_for_interval() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let (store, reaper) = reaper_with_expired_recording();
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(ReaperLoop::new(reaper, Duration::from_secs(3600)).run(rx));
        wait_until_empty(&store).await;

        add_expired_recording(&store, now);
        tokio::time::advance(Duration::from_secs(3599)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(store.len().unwrap(), 1, "swept before the interval elapsed");

        tokio::time::advance(Duration::from_secs(1)).await;
        wait_until_empty(&store).await;

        tx.send(true).unwrap();
        let sweeps = handle.await.unwrap();
        assert_eq!(sweeps, 2);
    }

    #[tokio::test]
    async fn stops_before_sweeping_when_already_shut_down() {
        let (store, reaper) = reaper_with_expired_recording();
        let (_tx, rx) = watch::channel(true);

        let sweeps = ReaperLoop::new(reaper, Duration::from_secs(3600)).run(rx).await;

        assert_eq!(sweeps, 0);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn stops_when_sender_is_dropped() {
        let (store, reaper) = reaper_with_expired_recording();
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(ReaperLoop::new(reaper, Duration::from_secs(3600)).run(rx));

        while !store.is_empty().unwrap() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        drop(tx);

        let sweeps = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop did not stop")
            .unwrap();
        assert_eq!(sweeps, 1);
    }
}
