pub mod play;
pub mod serve;

pub use play::{LeaderboardSubmitter, PlayMode};
pub use serve::ServeMode;
