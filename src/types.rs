//! Domain types for the venue collection service
//!
//! Everything that crosses a component boundary lives here: the venue
//! record and its dedup key, the category enumeration, the persisted
//! progress snapshot, and the per-run report returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Categories of volleyball data collected, in fixed rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataCategory {
    Courts,
    Academies,
    Equipment,
    Tournaments,
    Clubs,
}

impl DataCategory {
    /// Round-robin order used by the rotation policy.
    pub const ALL: [DataCategory; 5] = [
        Self::Courts,
        Self::Academies,
        Self::Equipment,
        Self::Tournaments,
        Self::Clubs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Courts => "courts",
            Self::Academies => "academies",
            Self::Equipment => "equipment",
            Self::Tournaments => "tournaments",
            Self::Clubs => "clubs",
        }
    }

    /// Human phrasing used when building search queries.
    pub fn search_phrase(&self) -> &'static str {
        match self {
            Self::Courts => "volleyball courts",
            Self::Academies => "volleyball academies",
            Self::Equipment => "volleyball equipment stores",
            Self::Tournaments => "volleyball tournaments",
            Self::Clubs => "volleyball clubs",
        }
    }
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "courts" => Ok(Self::Courts),
            "academies" => Ok(Self::Academies),
            "equipment" => Ok(Self::Equipment),
            "tournaments" => Ok(Self::Tournaments),
            "clubs" => Ok(Self::Clubs),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// US states covered by the rotation, in scan order.
pub const USA_STATES: [&str; 51] = [
    "Alabama", "Alaska", "Arizona", "Arkansas", "California",
    "Colorado", "Connecticut", "Delaware", "Florida", "Georgia",
    "Hawaii", "Idaho", "Illinois", "Indiana", "Iowa",
    "Kansas", "Kentucky", "Louisiana", "Maine", "Maryland",
    "Massachusetts", "Michigan", "Minnesota", "Mississippi", "Missouri",
    "Montana", "Nebraska", "Nevada", "New Hampshire", "New Jersey",
    "New Mexico", "New York", "North Carolina", "North Dakota", "Ohio",
    "Oklahoma", "Oregon", "Pennsylvania", "Rhode Island", "South Carolina",
    "South Dakota", "Tennessee", "Texas", "Utah", "Vermont",
    "Virginia", "Washington", "West Virginia", "Wisconsin", "Wyoming",
    "District of Columbia",
];

/// India states covered by the rotation, scanned after the US list.
pub const INDIA_STATES: [&str; 30] = [
    "Andhra Pradesh", "Arunachal Pradesh", "Assam", "Bihar", "Chhattisgarh",
    "Goa", "Gujarat", "Haryana", "Himachal Pradesh", "Jharkhand",
    "Karnataka", "Kerala", "Madhya Pradesh", "Maharashtra", "Manipur",
    "Meghalaya", "Mizoram", "Nagaland", "Odisha", "Punjab",
    "Rajasthan", "Sikkim", "Tamil Nadu", "Telangana", "Tripura",
    "Uttar Pradesh", "Uttarakhand", "West Bengal",
    "Delhi", "Chandigarh",
];

/// A single discovered volleyball venue. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub category: DataCategory,
    pub state: String,
    pub country: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default = "Utc::now")]
    pub collected_at: DateTime<Utc>,
}

impl Venue {
    /// Case-insensitive identity key. Two venues with the same key are the
    /// same real-world entity; later writes are dropped, not merged.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.name.to_lowercase(),
            self.state.to_lowercase(),
            self.country.to_lowercase()
        )
    }

    /// Build a venue from one raw search record. Records without a
    /// non-empty `name` field are rejected.
    pub fn from_record(
        record: &Value,
        state: &str,
        country: &str,
        category: DataCategory,
    ) -> Option<Self> {
        let name = record.get("name")?.as_str()?.trim();
        if name.is_empty() {
            return None;
        }

        let field = |key: &str| {
            record
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Some(Self {
            name: name.to_string(),
            category,
            state: state.to_string(),
            country: country.to_string(),
            address: field("address"),
            website: field("website"),
            phone: field("phone"),
            email: field("email"),
            description: field("description"),
            source_url: field("source_url"),
            collected_at: Utc::now(),
        })
    }
}

/// Persisted singleton describing live collection status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionProgress {
    #[serde(default)]
    pub total_states: usize,
    #[serde(default)]
    pub completed_states: usize,
    #[serde(default)]
    pub current_state: Option<String>,
    #[serde(default)]
    pub current_country: Option<String>,
    #[serde(default)]
    pub total_results: usize,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_run_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_running: bool,
}

/// Outcome class of one collection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Skipped,
    Error,
}

/// Structured result of one collection attempt, also the HTTP trigger
/// response body.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub state: Option<String>,
    pub country: Option<String>,
    pub category: Option<DataCategory>,
    pub query_used: Option<String>,
    pub venues_found: usize,
    pub new_venues_saved: usize,
    pub executed_tools: Vec<String>,
    pub error: Option<String>,
}

impl RunReport {
    #[allow(clippy::too_many_arguments)]
    pub fn success(
        state: String,
        country: String,
        category: DataCategory,
        query_used: String,
        venues_found: usize,
        new_venues_saved: usize,
        executed_tools: Vec<String>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: RunStatus::Success,
            state: Some(state),
            country: Some(country),
            category: Some(category),
            query_used: Some(query_used),
            venues_found,
            new_venues_saved,
            executed_tools,
            error: None,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: RunStatus::Skipped,
            state: None,
            country: None,
            category: None,
            query_used: None,
            venues_found: 0,
            new_venues_saved: 0,
            executed_tools: Vec::new(),
            error: Some(reason.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: RunStatus::Error,
            state: None,
            country: None,
            category: None,
            query_used: None,
            venues_found: 0,
            new_venues_saved: 0,
            executed_tools: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Aggregate counts over the stored venue set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    pub total_venues: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_country: BTreeMap<String, usize>,
    pub by_state: BTreeMap<String, usize>,
}
