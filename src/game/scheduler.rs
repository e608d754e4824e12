//! Tick gating.
//!
//! The play loop polls the scheduler once per frame. A simulation step is only
//! approved once the score-dependent interval has elapsed since the previous
//! step, so most frames are no-ops.

use std::time::{Duration, Instant};

use super::config::GameConfig;
use super::state::level_for_score;

/// `max(min, base - step * (level - 1))`
pub fn interval_for_score(score: u32, config: &GameConfig) -> Duration {
    let level = level_for_score(score, config.level_span) as u64;
    let speedup = config.interval_step_ms.saturating_mul(level - 1);
    let ms = config
        .base_interval_ms
        .saturating_sub(speedup)
        .max(config.min_interval_ms);
    Duration::from_millis(ms)
}

/// Handle for one armed loop. Invalidated by the next `arm` or `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDecision {
    /// Interval not yet elapsed
    Wait,
    /// Run one simulation step
    Tick,
    /// Ticket belongs to a cancelled loop
    Stale,
}

#[derive(Debug, Clone)]
pub struct TickScheduler {
    config: GameConfig,
    generation: u64,
    armed: bool,
    last_tick: Option<Instant>,
}

impl TickScheduler {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            generation: 0,
            armed: false,
            last_tick: None,
        }
    }

    /// Start a new loop, cancelling any earlier one
    pub fn arm(&mut self) -> FrameTicket {
        self.generation += 1;
        self.armed = true;
        self.last_tick = None;
        FrameTicket {
            generation: self.generation,
        }
    }

    /// Cancel the current loop
    pub fn stop(&mut self) {
        self.generation += 1;
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn interval(&self, score: u32) -> Duration {
        interval_for_score(score, &self.config)
    }

    /// Called once per frame
    pub fn poll(&mut self, ticket: FrameTicket, now: Instant, score: u32) -> FrameDecision {
        if !self.armed || ticket.generation != self.generation {
            return FrameDecision::Stale;
        }

        if let Some(last) = self.last_tick {
            if now.saturating_duration_since(last) < self.interval(score) {
                return FrameDecision::Wait;
            }
        }

        self.last_tick = Some(now);
        FrameDecision::Tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_interval_by_level() {
        let config = GameConfig::default();
        assert_eq!(interval_for_score(0, &config), ms(250));
        assert_eq!(interval_for_score(99, &config), ms(250));
        assert_eq!(interval_for_score(100, &config), ms(230));
        assert_eq!(interval_for_score(500, &config), ms(150));
        assert_eq!(interval_for_score(800, &config), ms(90));
        assert_eq!(interval_for_score(900, &config), ms(80));
        assert_eq!(interval_for_score(100_000, &config), ms(80));
    }

    #[test]
    fn test_interval_monotonic_with_floor() {
        let config = GameConfig::default();
        let mut previous = interval_for_score(0, &config);
        for score in (0..5_000).step_by(5) {
            let current = interval_for_score(score, &config);
            assert!(current <= previous);
            assert!(current >= ms(config.min_interval_ms));
            previous = current;
        }
    }

    #[test]
    fn test_first_frame_ticks_then_waits() {
        let mut scheduler = TickScheduler::new(GameConfig::default());
        let ticket = scheduler.arm();
        let t0 = Instant::now();

        assert_eq!(scheduler.poll(ticket, t0, 0), FrameDecision::Tick);
        assert_eq!(scheduler.poll(ticket, t0 + ms(16), 0), FrameDecision::Wait);
        assert_eq!(scheduler.poll(ticket, t0 + ms(249), 0), FrameDecision::Wait);
        assert_eq!(scheduler.poll(ticket, t0 + ms(250), 0), FrameDecision::Tick);
    }

    #[test]
    fn test_cadence_follows_score() {
        let mut scheduler = TickScheduler::new(GameConfig::default());
        let ticket = scheduler.arm();
        let t0 = Instant::now();

        assert_eq!(scheduler.poll(ticket, t0, 0), FrameDecision::Tick);
        // level 2 shortens the wait to 230ms
        assert_eq!(scheduler.poll(ticket, t0 + ms(230), 120), FrameDecision::Tick);
    }

    #[test]
    fn test_stale_ticket_never_ticks() {
        let mut scheduler = TickScheduler::new(GameConfig::default());
        let old = scheduler.arm();
        let fresh = scheduler.arm();
        let t0 = Instant::now();

        assert_eq!(scheduler.poll(old, t0, 0), FrameDecision::Stale);
        assert_eq!(scheduler.poll(fresh, t0, 0), FrameDecision::Tick);

        scheduler.stop();
        assert!(!scheduler.is_armed());
        assert_eq!(scheduler.poll(fresh, t0 + ms(1000), 0), FrameDecision::Stale);
    }
}
