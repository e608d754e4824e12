use super::{
    catalog::EntityPool,
    config::GameConfig,
    direction::Direction,
    grid::{Grid, Position},
    notice::Notice,
    state::{AcquiredRecord, CollisionType, FinalSummary, Phase, RunState, Snake},
};
use crate::storage::HighScoreStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Information about a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    /// Startup acquired this step
    pub acquired: Option<AcquiredRecord>,
    /// Whether a bonus startup was spawned alongside the replacement
    pub bonus_spawned: bool,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the run has ended
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

impl StepResult {
    fn idle(terminated: bool) -> Self {
        Self {
            terminated,
            info: StepInfo::default(),
        }
    }
}

/// Sole owner and mutator of the run state.
///
/// Presentation code gets `&RunState` through [`GameEngine::state`] and may only
/// call `start`, `tick` and `set_pending_direction`.
pub struct GameEngine {
    config: GameConfig,
    grid: Grid,
    pool: EntityPool,
    rng: StdRng,
    state: RunState,
    notice: Notice,
    summary: Option<FinalSummary>,
    high_scores: Box<dyn HighScoreStore>,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig, high_scores: Box<dyn HighScoreStore>) -> Self {
        Self::with_rng(config, high_scores, StdRng::from_entropy())
    }

    /// Deterministic spawns, for tests and replays
    pub fn with_seed(config: GameConfig, high_scores: Box<dyn HighScoreStore>, seed: u64) -> Self {
        Self::with_rng(config, high_scores, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, high_scores: Box<dyn HighScoreStore>, rng: StdRng) -> Self {
        let grid = Grid::new(config.grid_cols, config.grid_rows);
        let state = RunState::new(
            Phase::Idle,
            initial_snake(&config),
            Vec::new(),
            config.level_span,
        );
        tracing::debug!(best = high_scores.best(), "engine ready");

        Self {
            config,
            grid,
            pool: EntityPool::default(),
            rng,
            state,
            notice: Notice::new(),
            summary: None,
            high_scores,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn high_score(&self) -> u32 {
        self.high_scores.best()
    }

    /// Summary of the last finished run, while in game-over
    pub fn summary(&self) -> Option<&FinalSummary> {
        self.summary.as_ref()
    }

    pub fn notice(&self, now: Instant) -> Option<&str> {
        self.notice.visible(now)
    }

    /// Replace whatever run exists with a fresh one and begin playing
    pub fn start(&mut self) {
        let snake = initial_snake(&self.config);
        let mut items = Vec::with_capacity(self.config.max_live_items);
        for _ in 0..self.config.initial_items {
            match self.pool.spawn(&mut self.rng, &self.grid, &snake.body, &items) {
                Some(item) => items.push(item),
                None => tracing::warn!("no free cell for initial startup"),
            }
        }

        self.state = RunState::new(Phase::Playing, snake, items, self.config.level_span);
        self.notice.clear();
        self.summary = None;

        tracing::info!(
            cols = self.grid.cols(),
            rows = self.grid.rows(),
            items = self.state.items.len(),
            "run started"
        );
    }

    /// Queue a turn for the next tick. Reversals and input outside a run are
    /// dropped; the latest accepted turn wins.
    pub fn set_pending_direction(&mut self, direction: Direction) -> bool {
        if !self.state.is_playing() || self.state.snake.direction.is_opposite(direction) {
            return false;
        }
        self.state.pending_direction = direction;
        true
    }

    /// Execute one step of the game
    pub fn tick(&mut self, now: Instant) -> StepResult {
        match self.state.phase {
            Phase::Playing => {}
            Phase::Idle => return StepResult::idle(false),
            Phase::GameOver => return StepResult::idle(true),
        }

        self.state.snake.direction = self.state.pending_direction;
        self.state.last_tick = Some(now);

        let new_head = self.state.snake.head().moved_in_direction(self.state.snake.direction);

        if let Some(collision_type) = self.check_collision(new_head) {
            return self.game_over(collision_type);
        }

        let mut info = StepInfo::default();
        let hit = self.state.items.iter().position(|item| item.pos == new_head);

        if let Some(index) = hit {
            let item = self.state.items.remove(index);
            let record = AcquiredRecord::from(&item);
            self.state.score += record.value;
            self.state.portfolio.push(record.clone());
            self.notice.raise(
                format!("Acquired: {}", record.name),
                now,
                self.config.notice_duration(),
            );

            let mut occupied = self.state.snake.body.clone();
            occupied.push(new_head);
            self.spawn_item(&occupied);

            let chance = self.config.bonus_spawn_chance.clamp(0.0, 1.0);
            if self.rng.gen_bool(chance) && self.state.items.len() < self.config.max_live_items {
                info.bonus_spawned = self.spawn_item(&occupied);
            }

            tracing::info!(
                name = %record.name,
                tier = ?record.tier,
                value = record.value,
                score = self.state.score,
                level = self.state.level(),
                "startup acquired"
            );
            info.acquired = Some(record);
        }

        self.state.snake.advance(new_head, info.acquired.is_some());
        self.state.ticks += 1;

        StepResult {
            terminated: false,
            info,
        }
    }

    /// Wall first, then the pre-move body. The tail still counts as occupied.
    fn check_collision(&self, pos: Position) -> Option<CollisionType> {
        if !self.grid.contains(pos) {
            return Some(CollisionType::Wall);
        }

        if self.state.snake.occupies(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    fn spawn_item(&mut self, occupied: &[Position]) -> bool {
        match self
            .pool
            .spawn(&mut self.rng, &self.grid, occupied, &self.state.items)
        {
            Some(item) => {
                self.state.items.push(item);
                true
            }
            None => {
                tracing::warn!("board full, skipping spawn");
                false
            }
        }
    }

    fn game_over(&mut self, collision: CollisionType) -> StepResult {
        self.state.phase = Phase::GameOver;

        let score = self.state.score;
        let previous_best = self.high_scores.best();
        let new_record = score > previous_best;
        if new_record {
            match self.high_scores.record(score) {
                Ok(()) => tracing::info!(score, previous_best, "new high score"),
                Err(e) => tracing::warn!("failed to save high score: {e}"),
            }
        }

        let summary = FinalSummary {
            score,
            level: self.state.level(),
            portfolio: self.state.portfolio.clone(),
            collision,
            previous_best,
            new_record,
        };
        tracing::info!(
            score,
            startups = summary.startups(),
            unicorns = summary.unicorns(),
            collision = ?collision,
            ticks = self.state.ticks,
            "fund dissolved"
        );
        self.summary = Some(summary);

        StepResult {
            terminated: true,
            info: StepInfo {
                collision_type: Some(collision),
                ..Default::default()
            },
        }
    }
}

/// Horizontal snake on the middle row, head two cells in from its length
fn initial_snake(config: &GameConfig) -> Snake {
    let length = config.initial_snake_length;
    let head = Position::new(length as i32 + 2, (config.grid_rows / 2) as i32);
    Snake::new(head, Direction::Right, length)
}
