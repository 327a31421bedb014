//! Shared fixtures for integration tests

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use volleyhunt::traits::{MockQueryGenerator, SearchOutcome, SearchProvider};
use volleyhunt::{
    Collector, CollectorResult, DataCategory, ProgressTracker, QueryGenerator, RotationPolicy,
    VenueStore,
};

pub const RESULTS_PER_RUN: usize = 10;

/// Build a collector over a test data directory with injected providers.
pub async fn collector_with<S, Q>(dir: &Path, search: S, query_gen: Q) -> Collector<S, Q>
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    collector_with_timeout(dir, search, query_gen, Duration::from_secs(5)).await
}

pub async fn collector_with_timeout<S, Q>(
    dir: &Path,
    search: S,
    query_gen: Q,
    timeout: Duration,
) -> Collector<S, Q>
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    Collector::new(
        VenueStore::new(dir),
        ProgressTracker::new(dir),
        RotationPolicy::open(dir).await,
        search,
        query_gen,
        RESULTS_PER_RUN,
        timeout,
    )
}

/// Query generator that always produces the same stub query.
pub fn stub_query_gen() -> MockQueryGenerator {
    let mut query_gen = MockQueryGenerator::new();
    query_gen
        .expect_generate()
        .returning(|_, _, _| Ok("stub query".to_string()));
    query_gen
}

/// Query generator that always fails, forcing the fallback path.
pub fn failing_query_gen() -> MockQueryGenerator {
    let mut query_gen = MockQueryGenerator::new();
    query_gen
        .expect_generate()
        .returning(|_, _, _| Err(volleyhunt::CollectorError::query_generation("LLM down")));
    query_gen
}

/// A raw search record carrying only a name.
pub fn record(name: &str) -> Value {
    json!({ "name": name })
}

/// Build a SearchOutcome echoing back the query the collector passed in.
pub fn outcome_from_query(records: Vec<Value>, custom_query: &Option<String>) -> SearchOutcome {
    SearchOutcome {
        records,
        executed_tools: vec!["web_search".to_string()],
        query_used: custom_query.clone().unwrap_or_default(),
    }
}

/// Hand-written provider that sleeps before answering, for exercising the
/// single-run guard and the search deadline.
pub struct DelayedSearchProvider {
    pub delay: Duration,
    pub records: Vec<Value>,
}

#[async_trait]
impl SearchProvider for DelayedSearchProvider {
    async fn search(
        &self,
        _state: &str,
        _country: &str,
        _category: DataCategory,
        _max_results: usize,
        custom_query: Option<String>,
    ) -> CollectorResult<SearchOutcome> {
        tokio::time::sleep(self.delay).await;
        Ok(outcome_from_query(self.records.clone(), &custom_query))
    }
}
