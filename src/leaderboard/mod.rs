//! Top-score board: payload validation, a JSON-file store, the HTTP
//! service that fronts it and the client the game uses to submit runs.

pub mod client;
pub mod model;
pub mod server;
pub mod store;

pub use client::LeaderboardClient;
pub use model::{LeaderboardEntry, NewLeaderboardEntry, ValidationError, clamp_limit};
pub use server::serve;
pub use store::LeaderboardStore;
