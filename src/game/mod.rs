//! Core game logic for VC Snake
//!
//! Everything in here is free of terminal I/O so it can be driven by the
//! interactive mode or directly from tests.

pub mod catalog;
pub mod config;
pub mod direction;
pub mod engine;
pub mod grid;
pub mod notice;
pub mod scheduler;
pub mod state;

// Re-export commonly used types
pub use catalog::{CatalogEntry, EntityPool, Item, STARTUP_CATALOG, Tier};
pub use config::{GameConfig, MAX_GRID_SIDE};
pub use direction::Direction;
pub use engine::{GameEngine, StepInfo, StepResult};
pub use grid::{Grid, Position};
pub use notice::Notice;
pub use scheduler::{FrameDecision, FrameTicket, TickScheduler, interval_for_score};
pub use state::{
    AcquiredRecord, CollisionType, FinalSummary, Phase, RunState, Snake, level_for_score,
    tier_counts,
};
