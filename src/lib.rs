//! Volleyball venue collection service
//!
//! Periodically queries an LLM search capability to enumerate volleyball
//! venues across US and India states, deduplicates results into a flat
//! JSON store, and exposes the data and job status over a small HTTP API.
//! The rotation policy and collector form the core; the Groq clients,
//! scheduler and axum layer are thin plumbing around them.

pub mod collector;
pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod web;

// Re-export commonly used types
pub use collector::Collector;
pub use config::Settings;
pub use crate::core::RotationPolicy;
pub use error::{CollectorError, CollectorResult};
pub use services::{
    GroqSearchProvider, LlmQueryGenerator, ProgressTracker, SchedulerHandle, VenueStore,
};
pub use traits::{QueryGenerator, SearchOutcome, SearchProvider};
pub use types::{CollectionProgress, DataCategory, RunReport, RunStatus, Venue};
