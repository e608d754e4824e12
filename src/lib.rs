//! VC Snake - a terminal snake game where the snake acquires startups
//!
//! This library provides:
//! - Core game logic and the tick scheduler (game module)
//! - High-score persistence (storage module)
//! - TUI rendering and input mapping (render, input modules)
//! - The leaderboard service and client (leaderboard module)
//! - Execution modes: play and serve (modes module)

pub mod game;
pub mod input;
pub mod leaderboard;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod storage;
