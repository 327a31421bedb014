//! Flat-file venue persistence
//!
//! Venues live in a single JSON array file. Saves are read-modify-write
//! with key-based dedup; reads degrade to an empty set on missing or
//! corrupt data so a bad file never takes the service down.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};

use crate::error::{CollectorError, CollectorResult};
use crate::types::{DataCategory, StoreStats, Venue};

pub struct VenueStore {
    venues_file: PathBuf,
}

impl VenueStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            venues_file: data_dir.join("venues.json"),
        }
    }

    /// Append venues whose dedup key is not already stored, preserving
    /// insertion order (existing first, then new in input order). Returns
    /// the number of venues actually added. Write failures propagate;
    /// silently losing freshly found venues is worse than a visible error.
    pub async fn save(&self, venues: &[Venue]) -> CollectorResult<usize> {
        let mut all = self.load_all().await;
        let mut keys: HashSet<String> = all.iter().map(Venue::dedup_key).collect();

        let before = all.len();
        for venue in venues {
            if keys.insert(venue.dedup_key()) {
                all.push(venue.clone());
            }
        }

        let added = all.len() - before;
        if added > 0 {
            self.write_venues(&all).await?;
            info!("💾 Saved {} new venues", added);
        }

        Ok(added)
    }

    /// Full stored set; empty if never written or unreadable.
    pub async fn load_all(&self) -> Vec<Venue> {
        if !self.venues_file.exists() {
            return Vec::new();
        }

        match fs::read_to_string(&self.venues_file).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(venues) => venues,
                Err(e) => {
                    warn!("Corrupt venue file {}: {e}", self.venues_file.display());
                    Vec::new()
                }
            },
            Err(e) => {
                warn!("Unreadable venue file {}: {e}", self.venues_file.display());
                Vec::new()
            }
        }
    }

    /// Case-insensitive exact match on state, optionally narrowed to one
    /// country.
    pub async fn venues_by_state(&self, state: &str, country: Option<&str>) -> Vec<Venue> {
        let state = state.to_lowercase();
        self.load_all()
            .await
            .into_iter()
            .filter(|v| v.state.to_lowercase() == state)
            .filter(|v| country.is_none_or(|c| v.country.eq_ignore_ascii_case(c)))
            .collect()
    }

    pub async fn venues_by_category(&self, category: DataCategory) -> Vec<Venue> {
        self.load_all()
            .await
            .into_iter()
            .filter(|v| v.category == category)
            .collect()
    }

    /// Single pass over the stored set.
    pub async fn stats(&self) -> StoreStats {
        let venues = self.load_all().await;
        let mut stats = StoreStats {
            total_venues: venues.len(),
            ..StoreStats::default()
        };

        for venue in &venues {
            *stats
                .by_category
                .entry(venue.category.to_string())
                .or_insert(0) += 1;
            *stats.by_country.entry(venue.country.clone()).or_insert(0) += 1;
            *stats
                .by_state
                .entry(format!("{}, {}", venue.state, venue.country))
                .or_insert(0) += 1;
        }

        stats
    }

    async fn write_venues(&self, venues: &[Venue]) -> CollectorResult<()> {
        if let Some(parent) = self.venues_file.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CollectorError::storage("create_dir", parent, e))?;
        }

        let payload = serde_json::to_string_pretty(venues)?;
        fs::write(&self.venues_file, payload)
            .await
            .map_err(|e| CollectorError::storage("write", &self.venues_file, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn venue(name: &str, state: &str, country: &str, category: DataCategory) -> Venue {
        Venue::from_record(&json!({ "name": name }), state, country, category).unwrap()
    }

    fn test_store() -> (VenueStore, TempDir) {
        let temp = TempDir::new().unwrap();
        (VenueStore::new(temp.path()), temp)
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (store, _temp) = test_store();

        let venues = vec![
            venue("Court A", "Texas", "USA", DataCategory::Courts),
            venue("Court B", "Texas", "USA", DataCategory::Courts),
        ];
        let added = store.save(&venues).await.unwrap();
        assert_eq!(added, 2);

        let all = store.load_all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Court A");
        assert_eq!(all[1].name, "Court B");
    }

    #[tokio::test]
    async fn test_save_is_idempotent_case_insensitive() {
        let (store, _temp) = test_store();

        let first = vec![venue("Beach Club", "Florida", "USA", DataCategory::Clubs)];
        assert_eq!(store.save(&first).await.unwrap(), 1);

        let resaved = vec![venue("BEACH CLUB", "florida", "usa", DataCategory::Clubs)];
        assert_eq!(store.save(&resaved).await.unwrap(), 0);
        assert_eq!(store.load_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_save_dedups_within_batch() {
        let (store, _temp) = test_store();

        let batch = vec![
            venue("Net Works", "Goa", "India", DataCategory::Equipment),
            venue("Net Works", "Goa", "India", DataCategory::Equipment),
        ];
        assert_eq!(store.save(&batch).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_all_empty_when_never_written() {
        let (store, _temp) = test_store();
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_all_recovers_from_corrupt_file() {
        let (store, temp) = test_store();
        std::fs::write(temp.path().join("venues.json"), "{not valid json").unwrap();

        assert!(store.load_all().await.is_empty());

        // A save over the corrupt file starts fresh rather than erroring.
        let added = store
            .save(&[venue("Court A", "Ohio", "USA", DataCategory::Courts)])
            .await
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.load_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_filters_are_case_insensitive() {
        let (store, _temp) = test_store();
        store
            .save(&[
                venue("Court A", "New York", "USA", DataCategory::Courts),
                venue("Academy B", "Kerala", "India", DataCategory::Academies),
            ])
            .await
            .unwrap();

        assert_eq!(store.venues_by_state("new york", None).await.len(), 1);
        assert_eq!(store.venues_by_state("NEW YORK", None).await.len(), 1);
        assert_eq!(store.venues_by_state("Kansas", None).await.len(), 0);
        assert_eq!(
            store.venues_by_category(DataCategory::Academies).await.len(),
            1
        );
        assert_eq!(store.venues_by_category(DataCategory::Clubs).await.len(), 0);
    }

    #[tokio::test]
    async fn test_state_lookup_narrows_by_country() {
        let (store, _temp) = test_store();
        store
            .save(&[
                venue("Court A", "Georgia", "USA", DataCategory::Courts),
                venue("Court B", "Georgia", "India", DataCategory::Courts),
            ])
            .await
            .unwrap();

        assert_eq!(store.venues_by_state("Georgia", None).await.len(), 2);
        let usa_only = store.venues_by_state("Georgia", Some("usa")).await;
        assert_eq!(usa_only.len(), 1);
        assert_eq!(usa_only[0].name, "Court A");
        assert!(store
            .venues_by_state("Georgia", Some("Brazil"))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_stats_groups_counts() {
        let (store, _temp) = test_store();
        store
            .save(&[
                venue("Court A", "Texas", "USA", DataCategory::Courts),
                venue("Court B", "Texas", "USA", DataCategory::Courts),
                venue("Club C", "Kerala", "India", DataCategory::Clubs),
            ])
            .await
            .unwrap();

        let stats = store.stats().await;
        assert_eq!(stats.total_venues, 3);
        assert_eq!(stats.by_category["courts"], 2);
        assert_eq!(stats.by_category["clubs"], 1);
        assert_eq!(stats.by_country["USA"], 2);
        assert_eq!(stats.by_country["India"], 1);
        assert_eq!(stats.by_state["Texas, USA"], 2);
        assert_eq!(stats.by_state["Kerala, India"], 1);
    }
}
