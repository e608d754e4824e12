use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;

use super::{StorageError, write_json_atomic};

/// Single-slot store for the best score ever reached on this machine
pub trait HighScoreStore: Send {
    fn best(&self) -> u32;
    fn record(&mut self, score: u32) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HighScoreFile {
    best: u32,
}

/// JSON file in the data directory. Missing or unreadable files count as 0.
///
/// Inside a tokio runtime the file write runs on the blocking pool so the
/// frame loop never waits on disk; outside one it is written in place.
#[derive(Debug)]
pub struct FileHighScoreStore {
    path: PathBuf,
    best: u32,
    write_lock: Arc<Mutex<()>>,
}

fn read_best(path: &Path) -> u32 {
    fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<HighScoreFile>(&raw).ok())
        .map(|file| file.best)
        .unwrap_or(0)
}

/// Writes are serialized and never lower the stored best
fn persist(path: &Path, write_lock: &Mutex<()>, score: u32) -> Result<(), StorageError> {
    let _guard = write_lock.lock().unwrap_or_else(|e| e.into_inner());
    if read_best(path) >= score {
        return Ok(());
    }
    write_json_atomic(path, &HighScoreFile { best: score })?;
    tracing::info!(path = ?path, best = score, "high score saved");
    Ok(())
}

impl FileHighScoreStore {
    pub fn open(path: &Path) -> Self {
        let best = read_best(path);
        tracing::debug!(path = ?path, best, "loaded high score");
        Self {
            path: path.to_path_buf(),
            best,
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn best(&self) -> u32 {
        self.best
    }

    fn record(&mut self, score: u32) -> Result<(), StorageError> {
        let Ok(handle) = Handle::try_current() else {
            persist(&self.path, &self.write_lock, score)?;
            self.best = score;
            return Ok(());
        };

        self.best = score;
        let path = self.path.clone();
        let write_lock = Arc::clone(&self.write_lock);
        handle.spawn_blocking(move || {
            if let Err(e) = persist(&path, &write_lock, score) {
                tracing::warn!(error = %e, "failed to save high score");
            }
        });
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryHighScoreStore {
    best: u32,
}

impl MemoryHighScoreStore {
    pub fn with_best(best: u32) -> Self {
        Self { best }
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn best(&self) -> u32 {
        self.best
    }

    fn record(&mut self, score: u32) -> Result<(), StorageError> {
        self.best = score;
        Ok(())
    }
}
