//! Local persistence: the high-score slot and shared file helpers.

pub mod high_score;

pub use high_score::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the game keeps its files
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub high_score_path: PathBuf,
    pub leaderboard_path: PathBuf,
    pub log_path: PathBuf,
}

impl Paths {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let data_dir = dir.into();
        Self {
            high_score_path: data_dir.join("high_score.json"),
            leaderboard_path: data_dir.join("leaderboard.json"),
            log_path: data_dir.join("vc-snake.log"),
            data_dir,
        }
    }
}

/// Resolve the platform data directory, creating it if needed
pub fn project_paths(override_dir: Option<&Path>) -> Result<Paths> {
    let dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => ProjectDirs::from("com", "vc-snake", "VC Snake")
            .context("could not resolve project directories")?
            .data_local_dir()
            .to_path_buf(),
    };
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create directory: {:?}", dir))?;
    Ok(Paths::in_dir(dir))
}

/// Write JSON next to `path` and rename it into place
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(&tmp, data).map_err(|source| StorageError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}
