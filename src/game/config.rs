use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest board side a terminal layout can address
pub const MAX_GRID_SIDE: usize = 1000;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of columns on the board
    pub grid_cols: usize,
    /// Number of rows on the board
    pub grid_rows: usize,
    /// Segments in a freshly started snake
    pub initial_snake_length: usize,

    /// Items placed on the board by `start`
    pub initial_items: usize,
    /// Bonus spawns are only allowed below this many live items
    pub max_live_items: usize,
    /// Chance of a bonus spawn after each acquisition
    pub bonus_spawn_chance: f64,

    /// Score needed per level
    pub level_span: u32,
    /// Tick interval at level 1
    pub base_interval_ms: u64,
    /// Interval reduction per level
    pub interval_step_ms: u64,
    /// Fastest allowed tick interval
    pub min_interval_ms: u64,

    /// How long the "Acquired" notice stays up
    pub notice_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_cols: 25,
            grid_rows: 22,
            initial_snake_length: 4,
            initial_items: 3,
            max_live_items: 4,
            bonus_spawn_chance: 0.3,
            level_span: 100,
            base_interval_ms: 250,
            interval_step_ms: 20,
            min_interval_ms: 80,
            notice_ms: 1300,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            grid_cols: cols,
            grid_rows: rows,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig =
            serde_json::from_str(&raw).context("Failed to parse game config")?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the board can hold the starting layout
    pub fn validate(&self) -> Result<()> {
        if self.initial_snake_length == 0 {
            bail!("initial_snake_length must be at least 1");
        }
        // head sits two cells in from the tail end, see `GameEngine::start`
        if self.grid_cols < self.initial_snake_length + 3 || self.grid_rows < 1 {
            bail!(
                "grid {}x{} is too small for a snake of length {}",
                self.grid_cols,
                self.grid_rows,
                self.initial_snake_length
            );
        }
        if self.grid_cols > MAX_GRID_SIDE || self.grid_rows > MAX_GRID_SIDE {
            bail!(
                "grid {}x{} exceeds the {}-cell limit per side",
                self.grid_cols,
                self.grid_rows,
                MAX_GRID_SIDE
            );
        }
        if self.initial_items == 0 || self.initial_items > self.max_live_items {
            bail!(
                "initial_items must be in 1..={} (got {})",
                self.max_live_items,
                self.initial_items
            );
        }
        if !(0.0..=1.0).contains(&self.bonus_spawn_chance) {
            bail!("bonus_spawn_chance must be within [0, 1]");
        }
        if self.level_span == 0 {
            bail!("level_span must be positive");
        }
        if self.min_interval_ms == 0 || self.min_interval_ms > self.base_interval_ms {
            bail!("min_interval_ms must be in 1..=base_interval_ms");
        }
        Ok(())
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_cols, 25);
        assert_eq!(config.grid_rows, 22);
        assert_eq!(config.initial_snake_length, 4);
        assert_eq!(config.initial_items, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 12);
        assert_eq!(config.grid_cols, 15);
        assert_eq!(config.grid_rows, 12);
        assert_eq!(config.max_live_items, 4);
    }

    #[test]
    fn test_rejects_tiny_grid() {
        assert!(GameConfig::new(5, 5).validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_grid() {
        assert!(GameConfig::new(40_000, 22).validate().is_err());
        assert!(GameConfig::new(25, MAX_GRID_SIDE + 1).validate().is_err());
        assert!(GameConfig::new(MAX_GRID_SIDE, MAX_GRID_SIDE).validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"grid_cols": 30, "bonus_spawn_chance": 0.0}}"#).unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.grid_cols, 30);
        assert_eq!(config.grid_rows, 22);
        assert_eq!(config.bonus_spawn_chance, 0.0);
    }

    #[test]
    fn test_load_rejects_bad_chance() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"bonus_spawn_chance": 1.5}}"#).unwrap();

        assert!(GameConfig::load(file.path()).is_err());
    }
}
