//! Symbolic snapshot of the board after each step

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use super::{
    geometry::Cell,
    grid::{BlockGrid, EdgeDiscs},
};

/// Life-loss penalty fed to the enemy channel.
pub const DEATH_PENALTY: f64 = -500.0;

/// Reward accrued during one step, split by the concern that earned it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StepReward {
    /// Points for changing block colors (and level bonuses).
    pub block: i64,
    /// Points for catching the green ball or Sam.
    pub friendly: i64,
    /// Points for defeating a pursuer (luring Coily off a disc).
    pub enemy: i64,
    /// Penalty applied when a life is lost (not part of the score).
    pub enemy_penalty: f64,
}

impl StepReward {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Game score earned this step.
    pub fn score(&self) -> i64 {
        self.block + self.friendly + self.enemy
    }

    /// Score plus penalty, used by single-policy learners that see everything.
    pub fn total(&self) -> f64 {
        self.score() as f64 + self.enemy_penalty
    }

    pub fn block_reward(&self) -> f64 {
        self.block as f64
    }

    pub fn friendly_reward(&self) -> f64 {
        self.friendly as f64
    }

    pub fn enemy_reward(&self) -> f64 {
        self.enemy as f64 + self.enemy_penalty
    }

    pub fn life_lost(&self) -> bool {
        self.enemy_penalty < 0.0
    }
}

impl AddAssign for StepReward {
    fn add_assign(&mut self, rhs: Self) {
        self.block += rhs.block;
        self.friendly += rhs.friendly;
        self.enemy += rhs.enemy;
        self.enemy_penalty += rhs.enemy_penalty;
    }
}

/// Everything the learners may know about the world at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Block Qbert is standing on.
    pub position: Cell,
    /// Blocks already showing the target color.
    pub colored: BlockGrid<bool>,
    /// Blocks occupied by an enemy (Coily, purple ball, Ugg, Wrongway).
    pub enemies: BlockGrid<bool>,
    /// Blocks occupied by a friendly (green ball, Sam).
    pub friendlies: BlockGrid<bool>,
    /// Flying discs beside the row edges.
    pub discs: EdgeDiscs,
    pub level: u32,
    pub lives: u32,
    /// Reward accrued by the step that produced this observation.
    pub reward: StepReward,
}

impl Observation {
    /// Fresh observation with Qbert on the top block and nothing colored.
    pub fn new(lives: u32) -> Self {
        Self {
            position: Cell::TOP,
            colored: BlockGrid::new(),
            enemies: BlockGrid::new(),
            friendlies: BlockGrid::new(),
            discs: EdgeDiscs::new(),
            level: 1,
            lives,
            reward: StepReward::zero(),
        }
    }

    pub fn with_position(mut self, position: Cell) -> Self {
        self.position = position;
        self
    }

    /// Hypothetical observation after Qbert lands on `cell`: position moved and
    /// the landing block colored; everything else unchanged.
    pub fn projected(&self, cell: Cell) -> Observation {
        let mut next = self.clone();
        next.position = cell;
        next.colored.set(cell, true);
        next.reward = StepReward::zero();
        next
    }

    /// Enemy on the current block or on any block one legal move away.
    pub fn enemy_nearby(&self) -> bool {
        Self::occupied_nearby(&self.enemies, self.position)
    }

    /// Friendly on the current block or on any block one legal move away.
    pub fn friendly_nearby(&self) -> bool {
        Self::occupied_nearby(&self.friendlies, self.position)
    }

    fn occupied_nearby(grid: &BlockGrid<bool>, position: Cell) -> bool {
        grid.get(position) || position.neighbors().any(|(_, cell)| grid.get(cell))
    }

    /// All blocks show the target color.
    pub fn level_complete(&self) -> bool {
        self.colored.all()
    }
}
