//! Groq-backed search provider
//!
//! Talks to the `groq/compound` model, which carries built-in web search.
//! The model is asked to return a bare JSON array of venue objects; since
//! it often wraps the array in prose, parsing scans for the outermost
//! brackets before deserializing. Unparseable content degrades to zero
//! records rather than an error: a partial or empty result is a valid
//! outcome.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{CollectorError, CollectorResult};
use crate::traits::{SearchOutcome, SearchProvider};
use crate::types::DataCategory;

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const SEARCH_MODEL: &str = "groq/compound";

pub struct GroqSearchProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GroqSearchProvider {
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

    fn system_prompt(category: DataCategory) -> &'static str {
        match category {
            DataCategory::Courts => {
                "You are an expert volleyball venue researcher. Find volleyball \
                 courts and playing venues: indoor and beach courts, recreation \
                 centers, sports complexes, and community centers with volleyball \
                 facilities."
            }
            DataCategory::Academies => {
                "You are an expert volleyball training researcher. Find volleyball \
                 academies and training centers: coaching academies, youth \
                 programs, professional training centers, and summer camps."
            }
            DataCategory::Equipment => {
                "You are an expert volleyball equipment researcher. Find volleyball \
                 equipment stores and suppliers: sporting goods stores, specialty \
                 shops, online retailers, and wholesale suppliers."
            }
            DataCategory::Tournaments => {
                "You are an expert volleyball event researcher. Find volleyball \
                 tournaments and events: local tournaments, beach competitions, \
                 youth leagues, and professional events."
            }
            DataCategory::Clubs => {
                "You are an expert volleyball club researcher. Find volleyball \
                 clubs and teams: club teams, adult leagues, youth clubs, and \
                 competitive organizations."
            }
        }
    }

    fn extraction_prompt() -> &'static str {
        "For each venue found, extract and return as a JSON array of objects \
         with fields: name, address, website, phone, email, description, \
         source_url. Return ONLY a valid JSON array of venues. Do not include \
         any other text. If no venues are found, return an empty array: []"
    }
}

#[async_trait]
impl SearchProvider for GroqSearchProvider {
    async fn search(
        &self,
        state: &str,
        country: &str,
        category: DataCategory,
        max_results: usize,
        custom_query: Option<String>,
    ) -> CollectorResult<SearchOutcome> {
        let query = custom_query
            .unwrap_or_else(|| format!("Find {max_results} {category} in {state}, {country}"));

        debug!("🔍 Searching: {query}");

        let body = json!({
            "model": SEARCH_MODEL,
            "messages": [
                {"role": "system", "content": Self::system_prompt(category)},
                {"role": "user", "content": format!("{query}\n\n{}", Self::extraction_prompt())}
            ],
            "temperature": 0.1,
            "max_tokens": 4096,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CollectorError::search(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CollectorError::search(format!(
                "Groq API returned {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| CollectorError::search(format!("invalid response body: {e}")))?;

        let message = &payload["choices"][0]["message"];
        let content = message["content"].as_str().unwrap_or("[]");

        let executed_tools = message["executed_tools"]
            .as_array()
            .map(|tools| {
                tools
                    .iter()
                    .map(|t| t["type"].as_str().unwrap_or("unknown").to_string())
                    .collect()
            })
            .unwrap_or_default();

        let mut records = extract_json_array(content);
        records.truncate(max_results);

        debug!("🔍 Found {} raw records for {state}, {country}", records.len());
        Ok(SearchOutcome {
            records,
            executed_tools,
            query_used: query,
        })
    }
}

/// Pull a JSON array out of model output that may carry surrounding prose.
fn extract_json_array(content: &str) -> Vec<Value> {
    let (Some(start), Some(end)) = (content.find('['), content.rfind(']')) else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<Value>>(&content[start..=end]) {
        Ok(records) => records,
        Err(e) => {
            warn!("Failed to parse search response as JSON array: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat_response(content: &str) -> serde_json::Value {
        json!({
            "choices": [{
                "message": {
                    "content": content,
                    "executed_tools": [{"type": "web_search"}]
                }
            }]
        })
    }

    #[tokio::test]
    async fn test_search_parses_records_and_tools() {
        let server = MockServer::start().await;
        let content = r#"Here are the venues I found:
[{"name": "Central Park Courts", "address": "New York, NY"}]"#;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(content)))
            .mount(&server)
            .await;

        let provider =
            GroqSearchProvider::new("test-key".to_string()).with_base_url(server.uri());
        let outcome = provider
            .search("New York", "USA", DataCategory::Courts, 10, None)
            .await
            .unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0]["name"], "Central Park Courts");
        assert_eq!(outcome.executed_tools, vec!["web_search".to_string()]);
        assert!(outcome.query_used.contains("New York"));
    }

    #[tokio::test]
    async fn test_search_truncates_to_max_results() {
        let server = MockServer::start().await;
        let content = r#"[{"name": "A"}, {"name": "B"}, {"name": "C"}]"#;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(content)))
            .mount(&server)
            .await;

        let provider =
            GroqSearchProvider::new("test-key".to_string()).with_base_url(server.uri());
        let outcome = provider
            .search("Texas", "USA", DataCategory::Clubs, 2, None)
            .await
            .unwrap();
        assert_eq!(outcome.records.len(), 2);
    }

    #[tokio::test]
    async fn test_search_degrades_on_malformed_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_response("I could not find any venues, sorry!")),
            )
            .mount(&server)
            .await;

        let provider =
            GroqSearchProvider::new("test-key".to_string()).with_base_url(server.uri());
        let outcome = provider
            .search("Texas", "USA", DataCategory::Courts, 10, None)
            .await
            .unwrap();
        assert!(outcome.records.is_empty());
    }

    #[tokio::test]
    async fn test_search_errors_on_api_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider =
            GroqSearchProvider::new("test-key".to_string()).with_base_url(server.uri());
        let result = provider
            .search("Texas", "USA", DataCategory::Courts, 10, None)
            .await;
        assert!(matches!(result, Err(CollectorError::Search { .. })));
    }

    #[test]
    fn test_extract_json_array_edge_cases() {
        assert!(extract_json_array("no brackets here").is_empty());
        assert!(extract_json_array("] backwards [").is_empty());
        assert!(extract_json_array("[{broken json]").is_empty());
        assert_eq!(extract_json_array("[]").len(), 0);
        assert_eq!(extract_json_array(r#"text [1, 2] text"#).len(), 2);
    }

    #[tokio::test]
    async fn test_custom_query_is_used_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("[]")))
            .mount(&server)
            .await;

        let provider =
            GroqSearchProvider::new("test-key".to_string()).with_base_url(server.uri());
        let outcome = provider
            .search(
                "Texas",
                "USA",
                DataCategory::Courts,
                10,
                Some("beach volleyball Austin contact".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(outcome.query_used, "beach volleyball Austin contact");
    }
}
