use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::leaderboard::{self, LeaderboardStore};

/// Hosts the leaderboard HTTP service
pub struct ServeMode {
    bind_addr: String,
    data_file: PathBuf,
}

impl ServeMode {
    pub fn new(bind_addr: impl Into<String>, data_file: PathBuf) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            data_file,
        }
    }

    pub async fn run(self) -> Result<()> {
        let store = LeaderboardStore::open(&self.data_file)
            .with_context(|| format!("Failed to open leaderboard file {:?}", self.data_file))?;

        leaderboard::serve(&self.bind_addr, store)
            .await
            .with_context(|| format!("Leaderboard server on {} failed", self.bind_addr))
    }
}
