//! Startup catalog and spawn selection.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::grid::{Grid, Position};

/// Funding stage of a startup. Ordered by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    Seed,
    SeriesA,
    SeriesB,
    Unicorn,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Seed, Tier::SeriesA, Tier::SeriesB, Tier::Unicorn];

    /// Reward in $M
    pub fn value(&self) -> u32 {
        match self {
            Tier::Seed => 5,
            Tier::SeriesA => 10,
            Tier::SeriesB => 20,
            Tier::Unicorn => 50,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Seed => "Seed",
            Tier::SeriesA => "Series A",
            Tier::SeriesB => "Series B",
            Tier::Unicorn => "Unicorn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub sector: &'static str,
    pub tier: Tier,
}

const fn entry(name: &'static str, sector: &'static str, tier: Tier) -> CatalogEntry {
    CatalogEntry { name, sector, tier }
}

pub const STARTUP_CATALOG: [CatalogEntry; 25] = [
    entry("Stripe", "Fintech", Tier::Unicorn),
    entry("OpenAI", "AI", Tier::Unicorn),
    entry("Figma", "Design", Tier::Unicorn),
    entry("Notion", "Productivity", Tier::SeriesB),
    entry("Linear", "Dev Tools", Tier::SeriesB),
    entry("Vercel", "Infra", Tier::SeriesB),
    entry("Loom", "Video", Tier::SeriesA),
    entry("Descript", "Audio/Video", Tier::SeriesA),
    entry("Clerk", "Auth", Tier::SeriesA),
    entry("Resend", "Email", Tier::Seed),
    entry("PlanetScale", "Database", Tier::SeriesA),
    entry("Railway", "Infra", Tier::Seed),
    entry("Raycast", "Productivity", Tier::SeriesA),
    entry("Retool", "No-Code", Tier::SeriesB),
    entry("Supabase", "Database", Tier::SeriesB),
    entry("Neon", "Database", Tier::Seed),
    entry("Loops", "Marketing", Tier::Seed),
    entry("Cal.com", "Scheduling", Tier::Seed),
    entry("Typefully", "Content", Tier::Seed),
    entry("Pika Labs", "AI/Video", Tier::SeriesA),
    entry("Perplexity", "AI Search", Tier::SeriesB),
    entry("Cursor", "Dev Tools", Tier::SeriesB),
    entry("Replit", "Dev Tools", Tier::Unicorn),
    entry("Anthropic", "AI", Tier::Unicorn),
    entry("Midjourney", "AI/Art", Tier::SeriesA),
];

/// A startup sitting on the board, waiting to be acquired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub pos: Position,
    pub name: String,
    pub sector: String,
    pub tier: Tier,
    pub value: u32,
}

impl Item {
    pub fn from_entry(entry: &CatalogEntry, pos: Position) -> Self {
        Self {
            pos,
            name: entry.name.to_string(),
            sector: entry.sector.to_string(),
            tier: entry.tier,
            value: entry.tier.value(),
        }
    }
}

/// Picks what spawns next and where.
#[derive(Debug, Clone, Copy)]
pub struct EntityPool {
    catalog: &'static [CatalogEntry],
}

impl Default for EntityPool {
    fn default() -> Self {
        Self::new(&STARTUP_CATALOG)
    }
}

impl EntityPool {
    pub fn new(catalog: &'static [CatalogEntry]) -> Self {
        Self { catalog }
    }

    /// Spawn one item on a free cell.
    ///
    /// Names already live on the board are avoided while unused names remain;
    /// once the catalog is exhausted any entry may repeat. `occupied` must list
    /// every snake cell, and live item positions are excluded as well.
    /// Returns `None` only when the board has no free cell left.
    pub fn spawn<R: Rng>(
        &self,
        rng: &mut R,
        grid: &Grid,
        occupied: &[Position],
        live: &[Item],
    ) -> Option<Item> {
        let live_names: HashSet<&str> = live.iter().map(|item| item.name.as_str()).collect();
        let unused: Vec<&CatalogEntry> = self
            .catalog
            .iter()
            .filter(|entry| !live_names.contains(entry.name))
            .collect();

        let pick = match unused.choose(rng) {
            Some(entry) => *entry,
            None => self.catalog.choose(rng)?,
        };

        let mut blocked: HashSet<Position> = occupied
            .iter()
            .copied()
            .filter(|&pos| grid.contains(pos))
            .collect();
        blocked.extend(live.iter().map(|item| item.pos));
        if blocked.len() >= grid.area() {
            return None;
        }

        let pos = loop {
            let candidate = Position::new(
                rng.gen_range(0..grid.cols()) as i32,
                rng.gen_range(0..grid.rows()) as i32,
            );
            if !blocked.contains(&candidate) {
                break candidate;
            }
        };

        Some(Item::from_entry(pick, pos))
    }
}
