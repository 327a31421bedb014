//! Rotation policy: which (state, country, category) to query next
//!
//! The rotation enumerates every US state, then every India state. A
//! location is only marked complete once the category cursor has wrapped a
//! full pass over all five categories for it, so each cycle visits every
//! state once per category before starting over. The completed set and
//! the category cursor are both persisted so a restart resumes mid-cycle.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::error::{CollectorError, CollectorResult};
use crate::types::{DataCategory, INDIA_STATES, USA_STATES};

/// Number of (state, country) pairs in one full cycle.
pub fn total_locations() -> usize {
    USA_STATES.len() + INDIA_STATES.len()
}

#[derive(Serialize, Deserialize)]
struct CursorState {
    category_index: usize,
}

pub struct RotationPolicy {
    completed_file: PathBuf,
    cursor_file: PathBuf,
    category_index: usize,
    /// True when the last `next_category` advance wrapped to index 0.
    wrapped: bool,
}

impl RotationPolicy {
    /// Open the policy against a data directory, restoring the persisted
    /// category cursor if one exists.
    pub async fn open(data_dir: &Path) -> Self {
        let cursor_file = data_dir.join("rotation.json");
        let category_index = match fs::read_to_string(&cursor_file).await {
            Ok(content) => match serde_json::from_str::<CursorState>(&content) {
                Ok(cursor) => cursor.category_index % DataCategory::ALL.len(),
                Err(e) => {
                    warn!("Corrupt rotation cursor {}: {e}", cursor_file.display());
                    0
                }
            },
            Err(_) => 0,
        };

        Self {
            completed_file: data_dir.join("completed_states.json"),
            cursor_file,
            category_index,
            wrapped: false,
        }
    }

    /// Locations already fully processed in the current cycle, as
    /// `"{state}|{country}"` keys. Missing or corrupt data reads as empty.
    pub async fn completed_locations(&self) -> HashSet<String> {
        match fs::read_to_string(&self.completed_file).await {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(entries) => entries.into_iter().collect(),
                Err(e) => {
                    warn!(
                        "Corrupt completed-states file {}: {e}",
                        self.completed_file.display()
                    );
                    HashSet::new()
                }
            },
            Err(_) => HashSet::new(),
        }
    }

    /// First not-yet-completed US state, then first India state, else
    /// reset the cycle and start over from the top of the US list. The
    /// linear scan is fine: the list is small and fixed.
    pub async fn next_location(&mut self) -> CollectorResult<(String, String)> {
        let completed = self.completed_locations().await;

        for state in USA_STATES {
            if !completed.contains(&format!("{state}|USA")) {
                return Ok((state.to_string(), "USA".to_string()));
            }
        }

        for state in INDIA_STATES {
            if !completed.contains(&format!("{state}|India")) {
                return Ok((state.to_string(), "India".to_string()));
            }
        }

        info!("🔁 All states completed, starting new cycle");
        self.reset().await?;
        Ok((USA_STATES[0].to_string(), "USA".to_string()))
    }

    /// Fixed round-robin over the categories. The cursor advances on every
    /// call regardless of how the run turns out, and is persisted
    /// best-effort: losing it only costs re-queried categories, not data.
    pub async fn next_category(&mut self) -> DataCategory {
        let category = DataCategory::ALL[self.category_index];
        self.category_index = (self.category_index + 1) % DataCategory::ALL.len();
        self.wrapped = self.category_index == 0;

        if let Err(e) = self.persist_cursor().await {
            warn!("Failed to persist category cursor: {e}");
        }

        category
    }

    /// Whether the last `next_category` call wrapped back to index 0.
    /// Location completion is recorded only on the wrap, once every full
    /// pass over all five categories.
    pub fn cursor_wrapped(&self) -> bool {
        self.wrapped
    }

    pub async fn mark_location_complete(&self, state: &str, country: &str) -> CollectorResult<()> {
        let mut completed = self.completed_locations().await;
        completed.insert(format!("{state}|{country}"));

        let mut entries: Vec<String> = completed.into_iter().collect();
        entries.sort();

        if let Some(parent) = self.completed_file.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CollectorError::storage("create_dir", parent, e))?;
        }
        let payload = serde_json::to_string(&entries)?;
        fs::write(&self.completed_file, payload)
            .await
            .map_err(|e| CollectorError::storage("write", &self.completed_file, e))
    }

    /// Clear the completed set unconditionally. Used by the automatic
    /// full-cycle wrap and by the explicit external reset request.
    pub async fn reset(&mut self) -> CollectorResult<()> {
        if self.completed_file.exists() {
            fs::remove_file(&self.completed_file)
                .await
                .map_err(|e| CollectorError::storage("remove", &self.completed_file, e))?;
        }
        info!("🔄 Collection cycle reset");
        Ok(())
    }

    async fn persist_cursor(&self) -> CollectorResult<()> {
        if let Some(parent) = self.cursor_file.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CollectorError::storage("create_dir", parent, e))?;
        }
        let payload = serde_json::to_string(&CursorState {
            category_index: self.category_index,
        })?;
        fs::write(&self.cursor_file, payload)
            .await
            .map_err(|e| CollectorError::storage("write", &self.cursor_file, e))
    }
}
