//! Collection progress persistence
//!
//! Single JSON document, rewritten whole on every save. Loads never fail:
//! a missing or corrupt file yields the defaulted progress. Locking is the
//! collector's responsibility, not ours.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::warn;

use crate::error::{CollectorError, CollectorResult};
use crate::types::CollectionProgress;

pub struct ProgressTracker {
    progress_file: PathBuf,
}

impl ProgressTracker {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            progress_file: data_dir.join("progress.json"),
        }
    }

    pub async fn load(&self) -> CollectionProgress {
        if !self.progress_file.exists() {
            return CollectionProgress::default();
        }

        match fs::read_to_string(&self.progress_file).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(progress) => progress,
                Err(e) => {
                    warn!(
                        "Corrupt progress file {}: {e}",
                        self.progress_file.display()
                    );
                    CollectionProgress::default()
                }
            },
            Err(e) => {
                warn!(
                    "Unreadable progress file {}: {e}",
                    self.progress_file.display()
                );
                CollectionProgress::default()
            }
        }
    }

    pub async fn save(&self, progress: &CollectionProgress) -> CollectorResult<()> {
        if let Some(parent) = self.progress_file.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CollectorError::storage("create_dir", parent, e))?;
        }

        let payload = serde_json::to_string_pretty(progress)?;
        fs::write(&self.progress_file, payload)
            .await
            .map_err(|e| CollectorError::storage("write", &self.progress_file, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_defaults_when_absent() {
        let temp = TempDir::new().unwrap();
        let tracker = ProgressTracker::new(temp.path());

        let progress = tracker.load().await;
        assert_eq!(progress.total_states, 0);
        assert!(!progress.is_running);
        assert!(progress.current_state.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let tracker = ProgressTracker::new(temp.path());

        let progress = CollectionProgress {
            total_states: 81,
            completed_states: 3,
            current_state: Some("Texas".to_string()),
            current_country: Some("USA".to_string()),
            total_results: 42,
            last_run_at: Some(Utc::now()),
            next_run_at: None,
            is_running: true,
        };
        tracker.save(&progress).await.unwrap();

        let loaded = tracker.load().await;
        assert_eq!(loaded.total_states, 81);
        assert_eq!(loaded.completed_states, 3);
        assert_eq!(loaded.current_state.as_deref(), Some("Texas"));
        assert_eq!(loaded.total_results, 42);
        assert!(loaded.is_running);
    }

    #[tokio::test]
    async fn test_load_defaults_on_corrupt_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("progress.json"), "][").unwrap();

        let tracker = ProgressTracker::new(temp.path());
        let progress = tracker.load().await;
        assert_eq!(progress.total_results, 0);
    }
}
