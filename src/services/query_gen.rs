//! LLM-backed search query generation
//!
//! A fast model produces a varied, location-specific query per run. When
//! generation fails the collector substitutes `fallback_query`, which is
//! deterministic so a broken generator never changes run behavior between
//! retries.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{CollectorError, CollectorResult};
use crate::traits::QueryGenerator;
use crate::types::DataCategory;

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const QUERY_MODEL: &str = "llama-3.3-70b-versatile";

/// Deterministic templated query used whenever LLM generation fails.
pub fn fallback_query(state: &str, country: &str, category: DataCategory) -> String {
    format!("{} in {state}, {country}", category.search_phrase())
}

pub struct LlmQueryGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl LlmQueryGenerator {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: GROQ_API_BASE.to_string(),
        }
    }

    /// Point at a different API base, for tests.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn prompt(state: &str, country: &str, category: DataCategory) -> String {
        format!(
            "Generate a specific search query to find volleyball {} in {state}, {country}.\n\
             \n\
             The query should:\n\
             1. Be specific enough to find real businesses/venues\n\
             2. Include location context\n\
             3. Target actual contact information or websites\n\
             \n\
             Examples of good queries:\n\
             - \"volleyball courts {state} with phone number\"\n\
             - \"beach volleyball clubs {state} {country} contact\"\n\
             - \"youth volleyball training academy {state} registration\"\n\
             \n\
             Return ONLY the search query, nothing else.",
            category.as_str()
        )
    }
}

#[async_trait]
impl QueryGenerator for LlmQueryGenerator {
    async fn generate(
        &self,
        state: &str,
        country: &str,
        category: DataCategory,
    ) -> CollectorResult<String> {
        let body = json!({
            "model": QUERY_MODEL,
            "messages": [
                {"role": "user", "content": Self::prompt(state, country, category)}
            ],
            "temperature": 0.8,
            "max_tokens": 100,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CollectorError::query_generation(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CollectorError::query_generation(format!(
                "API returned {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| CollectorError::query_generation(format!("invalid response: {e}")))?;

        let query = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string();

        if query.is_empty() {
            return Err(CollectorError::query_generation("empty query returned"));
        }

        debug!("📝 Generated query: {query}");
        Ok(query)
    }
}
