//! HTTP API surface
//!
//! Thin axum layer over the collector: trigger/pause/resume/reset job
//! control plus read-back of venues, stats and progress. Handlers only
//! read stored data or funnel into the collector's guarded run path.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::collector::Collector;
use crate::services::scheduler::SchedulerHandle;
use crate::traits::{QueryGenerator, SearchProvider};
use crate::types::{CollectionProgress, DataCategory, RunReport, RunStatus, StoreStats, Venue};

pub struct AppState<S, Q>
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    pub collector: Arc<Collector<S, Q>>,
    pub scheduler: SchedulerHandle,
}

impl<S, Q> Clone for AppState<S, Q>
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    fn clone(&self) -> Self {
        Self {
            collector: Arc::clone(&self.collector),
            scheduler: self.scheduler.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TriggerRequest {
    pub state: Option<String>,
    pub country: Option<String>,
    pub category: Option<DataCategory>,
    pub query: Option<String>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct VenueFilter {
    country: Option<String>,
}

#[derive(Serialize)]
struct StatsResponse {
    #[serde(flatten)]
    stats: StoreStats,
    collection_progress: CollectionProgress,
}

pub fn router<S, Q>(state: AppState<S, Q>) -> Router
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/jobs/trigger", post(trigger::<S, Q>))
        .route("/api/jobs/pause", post(pause::<S, Q>))
        .route("/api/jobs/resume", post(resume::<S, Q>))
        .route("/api/jobs/reset", post(reset::<S, Q>))
        .route("/api/jobs/status", get(status::<S, Q>))
        .route("/api/venues/state/:state", get(venues_by_state::<S, Q>))
        .route(
            "/api/venues/category/:category",
            get(venues_by_category::<S, Q>),
        )
        .route("/api/stats", get(stats::<S, Q>))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Trigger a run now, optionally overriding state/country/category and
/// supplying a custom query or result limit. A run already in progress
/// yields 409 with the skipped report as the body.
async fn trigger<S, Q>(
    State(app): State<AppState<S, Q>>,
    body: Option<Json<TriggerRequest>>,
) -> (StatusCode, Json<RunReport>)
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let report = app
        .collector
        .trigger_manual(
            request.state,
            request.country,
            request.category,
            request.query,
            request.max_results,
        )
        .await;

    let code = match report.status {
        RunStatus::Success => StatusCode::OK,
        RunStatus::Skipped => StatusCode::CONFLICT,
        RunStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (code, Json(report))
}

async fn pause<S, Q>(State(app): State<AppState<S, Q>>) -> Json<Value>
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    app.scheduler.pause();
    Json(json!({"status": "paused"}))
}

async fn resume<S, Q>(State(app): State<AppState<S, Q>>) -> Json<Value>
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    app.scheduler.resume();
    Json(json!({"status": "resumed"}))
}

async fn reset<S, Q>(
    State(app): State<AppState<S, Q>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)>
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    match app.collector.reset_rotation().await {
        Ok(()) => Ok(Json(json!({"status": "reset"}))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        )),
    }
}

async fn status<S, Q>(State(app): State<AppState<S, Q>>) -> Json<Value>
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    let progress = app.collector.progress_snapshot().await;
    Json(json!({
        "scheduler_paused": app.scheduler.is_paused(),
        "collection_in_progress": app.collector.is_running(),
        "interval_minutes": app.scheduler.interval().as_secs() / 60,
        "progress": progress,
    }))
}

async fn venues_by_state<S, Q>(
    State(app): State<AppState<S, Q>>,
    Path(state): Path<String>,
    Query(filter): Query<VenueFilter>,
) -> Json<Vec<Venue>>
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    Json(
        app.collector
            .store()
            .venues_by_state(&state, filter.country.as_deref())
            .await,
    )
}

async fn venues_by_category<S, Q>(
    State(app): State<AppState<S, Q>>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Venue>>, (StatusCode, Json<Value>)>
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    let category: DataCategory = category
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, Json(json!({"error": e}))))?;
    Ok(Json(app.collector.store().venues_by_category(category).await))
}

async fn stats<S, Q>(State(app): State<AppState<S, Q>>) -> Json<StatsResponse>
where
    S: SearchProvider + 'static,
    Q: QueryGenerator + 'static,
{
    Json(StatsResponse {
        stats: app.collector.store().stats().await,
        collection_progress: app.collector.progress_snapshot().await,
    })
}
