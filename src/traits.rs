//! Trait seams for the external collaborators
//!
//! The search capability and the query generator are the two pieces the
//! collector treats as black boxes. Both are defined here with mockall
//! annotations so tests can inject mocks through the same constructor
//! path as the real implementations.

use serde_json::Value;

use crate::error::CollectorResult;
use crate::types::DataCategory;

/// Raw output of one search invocation: unstructured records as returned
/// by the provider, the tool identifiers it executed, and the query string
/// it actually ran.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub records: Vec<Value>,
    pub executed_tools: Vec<String>,
    pub query_used: String,
}

/// External search capability: given a location, category and result
/// limit, returns zero or more venue-like records. Transient failures
/// (network, API) surface as errors for the collector to absorb.
#[mockall::automock]
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        state: &str,
        country: &str,
        category: DataCategory,
        max_results: usize,
        custom_query: Option<String>,
    ) -> CollectorResult<SearchOutcome>;
}

/// Query-generation collaborator. May fail; the collector falls back to a
/// deterministic templated query so a run never aborts here.
#[mockall::automock]
#[async_trait::async_trait]
pub trait QueryGenerator: Send + Sync {
    async fn generate(
        &self,
        state: &str,
        country: &str,
        category: DataCategory,
    ) -> CollectorResult<String>;
}
