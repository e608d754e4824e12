use std::time::{Duration, Instant};

use crate::game::FinalSummary;

/// Per-session counters shown in the HUD
pub struct GameMetrics {
    pub run_started: Option<Instant>,
    pub elapsed_time: Duration,
    pub games_played: u32,
    pub startups_acquired: usize,
    pub best_session_score: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            run_started: None,
            elapsed_time: Duration::ZERO,
            games_played: 0,
            startups_acquired: 0,
            best_session_score: 0,
        }
    }

    /// Advance the run clock. Frozen while no run is active.
    pub fn update(&mut self, now: Instant) {
        if let Some(start) = self.run_started {
            self.elapsed_time = now.saturating_duration_since(start);
        }
    }

    pub fn on_game_start(&mut self, now: Instant) {
        self.run_started = Some(now);
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self, summary: &FinalSummary, now: Instant) {
        self.update(now);
        self.run_started = None;
        self.games_played += 1;
        self.startups_acquired += summary.startups();
        self.best_session_score = self.best_session_score.max(summary.score);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{AcquiredRecord, CollisionType, Tier};

    fn summary(score: u32, startups: usize) -> FinalSummary {
        let record = AcquiredRecord {
            name: "Loom".to_string(),
            sector: "Video".to_string(),
            tier: Tier::SeriesA,
            value: 10,
        };
        FinalSummary {
            score,
            level: 1,
            portfolio: vec![record; startups],
            collision: CollisionType::SelfCollision,
            previous_best: 0,
            new_record: false,
        }
    }

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        metrics.elapsed_time = Duration::from_secs(125);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.elapsed_time = Duration::from_secs(0);
        assert_eq!(metrics.format_time(), "00:00");

        metrics.elapsed_time = Duration::from_secs(3661);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_clock_stops_at_game_over() {
        let t0 = Instant::now();
        let mut metrics = GameMetrics::new();
        metrics.on_game_start(t0);
        metrics.update(t0 + Duration::from_secs(30));
        assert_eq!(metrics.elapsed_time, Duration::from_secs(30));

        metrics.on_game_over(&summary(20, 2), t0 + Duration::from_secs(42));
        metrics.update(t0 + Duration::from_secs(90));
        assert_eq!(metrics.elapsed_time, Duration::from_secs(42));
    }

    #[test]
    fn test_session_totals() {
        let t0 = Instant::now();
        let mut metrics = GameMetrics::new();

        metrics.on_game_over(&summary(30, 3), t0);
        metrics.on_game_over(&summary(10, 1), t0);

        assert_eq!(metrics.games_played, 2);
        assert_eq!(metrics.startups_acquired, 4);
        assert_eq!(metrics.best_session_score, 30);
    }

    #[test]
    fn test_game_start_resets_time() {
        let t0 = Instant::now();
        let mut metrics = GameMetrics::new();
        metrics.on_game_start(t0);
        metrics.update(t0 + Duration::from_secs(5));

        metrics.on_game_start(t0 + Duration::from_secs(6));
        assert_eq!(metrics.elapsed_time, Duration::ZERO);
    }
}
