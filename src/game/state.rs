use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use super::catalog::{Item, Tier};
use super::direction::Direction;
use super::grid::Position;

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        // Add initial body segments behind the head
        let (dx, dy) = direction.delta();
        let (back_dx, back_dy) = (-dx, -dy);

        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(back_dx, back_dy));
        }

        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Check if any segment, head and tail included, sits on `pos`
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Put a new head in front. The tail is kept on growth ticks.
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Playing,
    GameOver,
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Snapshot of a startup at the moment it was acquired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquiredRecord {
    pub name: String,
    pub sector: String,
    pub tier: Tier,
    pub value: u32,
}

impl From<&Item> for AcquiredRecord {
    fn from(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            sector: item.sector.clone(),
            tier: item.tier,
            value: item.value,
        }
    }
}

/// Number of acquisitions per tier, every tier present
pub fn tier_counts(portfolio: &[AcquiredRecord]) -> BTreeMap<Tier, usize> {
    let mut counts: BTreeMap<Tier, usize> = Tier::ALL.iter().map(|&tier| (tier, 0)).collect();
    for record in portfolio {
        *counts.entry(record.tier).or_insert(0) += 1;
    }
    counts
}

pub fn level_for_score(score: u32, level_span: u32) -> u32 {
    score / level_span + 1
}

/// Complete state of one run. Owned by `GameEngine`; everything else reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub phase: Phase,
    pub snake: Snake,
    pub pending_direction: Direction,
    pub items: Vec<Item>,
    pub score: u32,
    pub portfolio: Vec<AcquiredRecord>,
    pub last_tick: Option<Instant>,
    pub ticks: u32,
    pub(crate) level_span: u32,
}

impl RunState {
    /// Create a fresh run around the given snake
    pub fn new(phase: Phase, snake: Snake, items: Vec<Item>, level_span: u32) -> Self {
        let pending_direction = snake.direction;
        Self {
            phase,
            snake,
            pending_direction,
            items,
            score: 0,
            portfolio: Vec::new(),
            last_tick: None,
            ticks: 0,
            level_span,
        }
    }

    pub fn direction(&self) -> Direction {
        self.snake.direction
    }

    pub fn level(&self) -> u32 {
        level_for_score(self.score, self.level_span)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }
}

/// What is left of a run once it ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSummary {
    pub score: u32,
    pub level: u32,
    pub portfolio: Vec<AcquiredRecord>,
    pub collision: CollisionType,
    pub previous_best: u32,
    pub new_record: bool,
}

impl FinalSummary {
    pub fn startups(&self) -> usize {
        self.portfolio.len()
    }

    pub fn unicorns(&self) -> usize {
        self.portfolio
            .iter()
            .filter(|record| record.tier == Tier::Unicorn)
            .count()
    }

    pub fn tier_counts(&self) -> BTreeMap<Tier, usize> {
        tier_counts(&self.portfolio)
    }
}
