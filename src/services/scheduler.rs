//! Recurring collection driver
//!
//! A tokio interval loop that fires `run_collection` on a fixed cadence.
//! Pausing does not cancel the loop; paused ticks are simply skipped, so
//! resume takes effect at the next tick without rebuilding anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::collector::Collector;
use crate::traits::{QueryGenerator, SearchProvider};

/// Shared handle for controlling and inspecting the timer.
#[derive(Clone)]
pub struct SchedulerHandle {
    paused: Arc<AtomicBool>,
    interval: Duration,
}

impl SchedulerHandle {
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
        info!("⏸️  Scheduler paused");
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        info!("▶️  Scheduler resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Spawn the recurring driver. Runs until the process shuts down.
pub fn spawn<S, Q>(collector: Arc<Collector<S, Q>>, interval: Duration) -> SchedulerHandle
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    let handle = SchedulerHandle {
        paused: Arc::new(AtomicBool::new(false)),
        interval,
    };
    let paused = Arc::clone(&handle.paused);

    info!(
        "⏱️  Scheduler started, running every {} minutes",
        interval.as_secs() / 60
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of a tokio interval fires immediately; consume it
        // so startup does not trigger a collection run.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if paused.load(Ordering::Acquire) {
                debug!("⏸️  Scheduler paused, skipping tick");
                continue;
            }

            let report = collector.run_collection().await;
            debug!(status = ?report.status, "⏱️  Scheduled run finished");

            let next = Utc::now()
                + chrono::Duration::from_std(interval).unwrap_or_else(|_| chrono::Duration::zero());
            collector.record_next_run(next).await;
        }
    });

    handle
}
