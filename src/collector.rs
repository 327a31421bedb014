//! Collection orchestrator
//!
//! Drives one collection cycle: pick the next (state, country, category)
//! from the rotation, generate a query, invoke the search capability,
//! merge results into the store, and update progress. One run at a time,
//! enforced by an atomic flag that both the timer and manual triggers go
//! through. Every failure inside a run is absorbed at this boundary and
//! returned as an error-status report with the running flag cleared.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::core::rotation::{total_locations, RotationPolicy};
use crate::error::{CollectorError, CollectorResult};
use crate::services::query_gen::fallback_query;
use crate::services::{ProgressTracker, VenueStore};
use crate::traits::{QueryGenerator, SearchOutcome, SearchProvider};
use crate::types::{CollectionProgress, DataCategory, RunReport, Venue};

pub struct Collector<S, Q>
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    store: VenueStore,
    progress: ProgressTracker,
    rotation: Mutex<RotationPolicy>,
    search: S,
    query_gen: Q,
    running: AtomicBool,
    results_per_run: usize,
    search_timeout: Duration,
}

impl<S, Q> Collector<S, Q>
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    pub fn new(
        store: VenueStore,
        progress: ProgressTracker,
        rotation: RotationPolicy,
        search: S,
        query_gen: Q,
        results_per_run: usize,
        search_timeout: Duration,
    ) -> Self {
        Self {
            store,
            progress,
            rotation: Mutex::new(rotation),
            search,
            query_gen,
            running: AtomicBool::new(false),
            results_per_run,
            search_timeout,
        }
    }

    /// Run one collection cycle against the rotation. Returns a skipped
    /// report, without touching storage, when a run is already active.
    pub async fn run_collection(&self) -> RunReport {
        if !self.try_acquire_run() {
            warn!("⏭️  Collection already in progress, skipping");
            return RunReport::skipped("collection already in progress");
        }

        let report = match self.execute_rotation_run().await {
            Ok(report) => report,
            Err(e) => self.absorb_failure(e).await,
        };

        self.running.store(false, Ordering::Release);
        report
    }

    /// Manual trigger. An explicit state bypasses the rotation entirely
    /// (country defaults to USA, category to courts); without one this is
    /// a normal rotation run. A caller-supplied query replaces generation
    /// verbatim, and `max_results` overrides the configured per-run limit
    /// (clamped to 1..=50). Same single-run guard either way.
    pub async fn trigger_manual(
        &self,
        state: Option<String>,
        country: Option<String>,
        category: Option<DataCategory>,
        query: Option<String>,
        max_results: Option<usize>,
    ) -> RunReport {
        let Some(state) = state else {
            return self.run_collection().await;
        };

        if !self.try_acquire_run() {
            warn!("⏭️  Collection already in progress, rejecting manual trigger");
            return RunReport::skipped("collection already in progress");
        }

        let country = country.unwrap_or_else(|| "USA".to_string());
        let category = category.unwrap_or(DataCategory::Courts);
        let limit = max_results.map_or(self.results_per_run, |n| n.clamp(1, 50));

        let report = match self
            .execute_manual_run(&state, &country, category, query, limit)
            .await
        {
            Ok(report) => report,
            Err(e) => self.absorb_failure(e).await,
        };

        self.running.store(false, Ordering::Release);
        report
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn store(&self) -> &VenueStore {
        &self.store
    }

    pub async fn progress_snapshot(&self) -> CollectionProgress {
        self.progress.load().await
    }

    /// Clear the rotation cycle on external request.
    pub async fn reset_rotation(&self) -> CollectorResult<()> {
        self.rotation.lock().await.reset().await
    }

    /// Record when the scheduler expects to run next. Best-effort, and
    /// serialized through the same run guard as collection itself: if a
    /// run holds the guard the update is dropped, so a stale snapshot can
    /// never overwrite that run's progress writes.
    pub async fn record_next_run(&self, at: DateTime<Utc>) {
        if !self.try_acquire_run() {
            debug!("Run in progress, skipping next-run timestamp update");
            return;
        }

        let mut progress = self.progress.load().await;
        progress.next_run_at = Some(at);
        if let Err(e) = self.progress.save(&progress).await {
            warn!("Failed to record next run time: {e}");
        }
        self.running.store(false, Ordering::Release);
    }

    fn try_acquire_run(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    async fn execute_rotation_run(&self) -> CollectorResult<RunReport> {
        let (state, country, category, wrapped) = {
            let mut rotation = self.rotation.lock().await;
            let (state, country) = rotation.next_location().await?;
            let category = rotation.next_category().await;
            (state, country, category, rotation.cursor_wrapped())
        };

        info!("🏐 Starting collection: {category} in {state}, {country}");
        self.mark_run_started(&state, &country).await?;

        let outcome = self
            .fetch(&state, &country, category, self.results_per_run, None)
            .await?;
        let venues = parse_venues(&outcome.records, &state, &country, category);
        let new_count = self.store.save(&venues).await?;

        // A location is complete only once the cursor has wrapped a full
        // pass over all five categories for it.
        if wrapped {
            let rotation = self.rotation.lock().await;
            rotation.mark_location_complete(&state, &country).await?;
            debug!("✅ Marked {state}, {country} complete for this cycle");
        }

        self.finalize_progress().await?;

        let report = RunReport::success(
            state,
            country,
            category,
            outcome.query_used,
            venues.len(),
            new_count,
            outcome.executed_tools,
        );
        info!(
            "🏁 Collection complete: {} found, {} new",
            report.venues_found, report.new_venues_saved
        );
        Ok(report)
    }

    async fn execute_manual_run(
        &self,
        state: &str,
        country: &str,
        category: DataCategory,
        custom_query: Option<String>,
        max_results: usize,
    ) -> CollectorResult<RunReport> {
        info!("🎯 Manual collection: {category} in {state}, {country}");
        self.mark_run_started(state, country).await?;

        let outcome = self
            .fetch(state, country, category, max_results, custom_query)
            .await?;
        let venues = parse_venues(&outcome.records, state, country, category);
        let new_count = self.store.save(&venues).await?;

        self.finalize_progress().await?;

        Ok(RunReport::success(
            state.to_string(),
            country.to_string(),
            category,
            outcome.query_used,
            venues.len(),
            new_count,
            outcome.executed_tools,
        ))
    }

    /// Generate a query (falling back to the deterministic template on
    /// failure) and invoke the search capability under a deadline. A
    /// caller-supplied query skips generation entirely.
    async fn fetch(
        &self,
        state: &str,
        country: &str,
        category: DataCategory,
        max_results: usize,
        custom_query: Option<String>,
    ) -> CollectorResult<SearchOutcome> {
        let query = match custom_query {
            Some(query) => query,
            None => match self.query_gen.generate(state, country, category).await {
                Ok(query) => query,
                Err(e) => {
                    warn!("📝 Query generation failed, using fallback: {e}");
                    fallback_query(state, country, category)
                }
            },
        };

        let search = self
            .search
            .search(state, country, category, max_results, Some(query));

        match tokio::time::timeout(self.search_timeout, search).await {
            Ok(result) => result,
            Err(_) => Err(CollectorError::SearchTimeout {
                seconds: self.search_timeout.as_secs(),
            }),
        }
    }

    async fn mark_run_started(&self, state: &str, country: &str) -> CollectorResult<()> {
        let mut progress = self.progress.load().await;
        progress.current_state = Some(state.to_string());
        progress.current_country = Some(country.to_string());
        progress.is_running = true;
        progress.last_run_at = Some(Utc::now());
        self.progress.save(&progress).await
    }

    async fn finalize_progress(&self) -> CollectorResult<()> {
        let stats = self.store.stats().await;
        let completed = {
            let rotation = self.rotation.lock().await;
            rotation.completed_locations().await
        };

        let mut progress = self.progress.load().await;
        progress.total_results = stats.total_venues;
        progress.completed_states = completed.len();
        progress.total_states = total_locations();
        progress.is_running = false;
        self.progress.save(&progress).await
    }

    /// Boundary for any failure during a run: clear the persisted running
    /// flag so it can never be left stuck, then report the error.
    async fn absorb_failure(&self, e: CollectorError) -> RunReport {
        error!("💥 Collection run failed: {e}");

        let mut progress = self.progress.load().await;
        if progress.is_running {
            progress.is_running = false;
            if let Err(save_err) = self.progress.save(&progress).await {
                error!("Failed to clear running flag: {save_err}");
            }
        }

        RunReport::failed(e.to_string())
    }
}

/// Parse raw search records into venues, keeping only records that carry
/// a non-empty name. Malformed records are dropped, not errors.
fn parse_venues(
    records: &[Value],
    state: &str,
    country: &str,
    category: DataCategory,
) -> Vec<Venue> {
    records
        .iter()
        .filter_map(|record| Venue::from_record(record, state, country, category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_venues_drops_nameless_records() {
        let records = vec![
            json!({"name": "Court A"}),
            json!({"address": "missing name"}),
            json!({"name": ""}),
            json!("not even an object"),
            json!({"name": "Court B", "phone": "555-0100"}),
        ];

        let venues = parse_venues(&records, "Texas", "USA", DataCategory::Courts);
        assert_eq!(venues.len(), 2);
        assert_eq!(venues[0].name, "Court A");
        assert_eq!(venues[1].name, "Court B");
        assert_eq!(venues[1].phone.as_deref(), Some("555-0100"));
    }
}
