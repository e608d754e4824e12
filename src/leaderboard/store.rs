use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::model::{LeaderboardEntry, NewLeaderboardEntry, clamp_limit};
use crate::storage::{StorageError, write_json_atomic};

/// Leaderboard rows kept in memory and mirrored to a JSON file when a path is set
#[derive(Debug, Default)]
pub struct LeaderboardStore {
    path: Option<PathBuf>,
    entries: RwLock<Vec<LeaderboardEntry>>,
}

impl LeaderboardStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load rows from `path`. A missing file starts an empty board.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let entries = match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(StorageError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        tracing::info!(path = ?path, rows = entries.len(), "leaderboard loaded");

        Ok(Self {
            path: Some(path.to_path_buf()),
            entries: RwLock::new(entries),
        })
    }

    /// Highest scores first. Ties keep submission order.
    pub fn top(&self, limit: Option<usize>) -> Vec<LeaderboardEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let mut sorted = entries.clone();
        sorted.sort_by(|a, b| b.score.cmp(&a.score));
        sorted.truncate(clamp_limit(limit));
        sorted
    }

    /// Store a validated submission. Nothing is kept if the file write fails.
    pub fn add(&self, new_entry: NewLeaderboardEntry) -> Result<LeaderboardEntry, StorageError> {
        let entry = new_entry.into_entry(Utc::now());
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.push(entry.clone());

        if let Some(path) = &self.path {
            if let Err(e) = write_json_atomic(path, &*entries) {
                entries.pop();
                return Err(e);
            }
        }
        Ok(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn submission(name: &str, score: u32) -> NewLeaderboardEntry {
        NewLeaderboardEntry {
            player_name: name.to_string(),
            score,
            startups: 3,
            unicorns: 0,
        }
    }

    #[test]
    fn test_top_sorts_descending_and_keeps_ties_in_order() {
        let store = LeaderboardStore::in_memory();
        store.add(submission("a", 10)).unwrap();
        store.add(submission("b", 50)).unwrap();
        store.add(submission("c", 10)).unwrap();

        let names: Vec<String> = store.top(None).into_iter().map(|e| e.player_name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_top_clamps_limit() {
        let store = LeaderboardStore::in_memory();
        for score in 0..30 {
            store.add(submission("p", score)).unwrap();
        }

        assert_eq!(store.top(None).len(), 20);
        assert_eq!(store.top(Some(3)).len(), 3);
        assert_eq!(store.top(Some(100)).len(), 20);
        assert_eq!(store.top(Some(3))[0].score, 29);
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("leaderboard.json");

        let store = LeaderboardStore::open(&path).unwrap();
        assert!(store.is_empty());
        let stored = store.add(submission("ada", 75)).unwrap();

        let reopened = LeaderboardStore::open(&path).unwrap();
        assert_eq!(reopened.top(None), vec![stored]);
    }

    #[test]
    fn test_failed_write_keeps_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("leaderboard.json");
        let store = LeaderboardStore::open(&path).unwrap();

        assert!(store.add(submission("ada", 75)).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("leaderboard.json");
        fs::write(&path, "{ nope").unwrap();

        let err = LeaderboardStore::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::Json { .. }));
        assert!(err.to_string().starts_with("JSON error in"));
    }
}
