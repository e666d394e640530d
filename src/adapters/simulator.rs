//! Symbolic Qbert board, played without an emulator.
//!
//! Close enough to the cabinet for the learners to have something to learn:
//! blocks change color under Qbert, one pursuer chases him, a friendly ball
//! bounces down the pyramid and edge discs carry him back to the top,
//! dropping a pursuer that was right behind him.

use rand::{
    Rng, SeedableRng,
    rngs::StdRng,
    seq::{IndexedRandom, SliceRandom},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Result,
    board::{Cell, DEATH_PENALTY, EdgeDiscs, Move, NUM_ROWS, Observation, Side, StepReward},
    error::Error,
    ports::Environment,
};

/// Points for turning a block to the target color.
pub const BLOCK_POINTS: i64 = 25;
/// Points for catching the green ball.
pub const FRIENDLY_POINTS: i64 = 100;
/// Points for luring the pursuer off the pyramid with a disc.
pub const LURE_POINTS: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub lives: u32,
    pub seed: Option<u64>,
    /// Steps before the pursuer enters, and before it returns after leaving.
    pub enemy_delay: usize,
    /// Probability that the pursuer steps toward Qbert rather than at random.
    pub chase_probability: f64,
    /// Per-step probability that a friendly ball appears when none is out.
    pub friendly_chance: f64,
    /// Discs placed beside the rows at the start of each level.
    pub discs: usize,
    pub level_bonus: i64,
    /// The game ends after this many moves.
    pub max_steps: Option<usize>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            lives: 4,
            seed: None,
            enemy_delay: 8,
            chase_probability: 0.75,
            friendly_chance: 0.05,
            discs: 2,
            level_bonus: 1_000,
            max_steps: Some(10_000),
        }
    }
}

impl SimulatorConfig {
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.lives == 0 {
            return Err(Error::InvalidConfiguration {
                message: "simulator needs at least one life".to_string(),
            });
        }
        for (name, p) in [
            ("chase probability", self.chase_probability),
            ("friendly chance", self.friendly_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must be in [0, 1], got {p}"),
                });
            }
        }
        if self.discs > 2 * (NUM_ROWS - 1) {
            return Err(Error::InvalidConfiguration {
                message: format!("at most {} discs fit beside the pyramid", 2 * (NUM_ROWS - 1)),
            });
        }
        Ok(())
    }
}

/// Jumps needed to get from `a` to `b`.
///
/// Along `row - col` and `col` the four moves act as the unit steps of a
/// square grid, so the distance is the L1 norm in those coordinates.
fn hop_distance(a: Cell, b: Cell) -> usize {
    let diag = |c: Cell| c.row() as i64 - c.col() as i64;
    ((diag(a) - diag(b)).abs() + (a.col() as i64 - b.col() as i64).abs()) as usize
}

/// Seeded [`Environment`] over the symbolic board.
#[derive(Debug, Clone)]
pub struct BoardSimulator {
    config: SimulatorConfig,
    rng: StdRng,
    obs: Observation,
    enemy: Option<Cell>,
    enemy_timer: usize,
    friendly: Option<Cell>,
    steps: usize,
    game_over: bool,
}

impl BoardSimulator {
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let mut sim = Self {
            config,
            rng,
            obs: Observation::new(config.lives),
            enemy: None,
            enemy_timer: config.enemy_delay,
            friendly: None,
            steps: 0,
            game_over: false,
        };
        sim.start_level();
        Ok(sim)
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    fn start_level(&mut self) {
        self.obs.position = Cell::TOP;
        self.obs.colored = Default::default();
        self.enemy = None;
        self.enemy_timer = self.config.enemy_delay;
        self.friendly = None;

        let mut slots: Vec<(usize, Side)> = (1..NUM_ROWS)
            .flat_map(|row| [(row, Side::Left), (row, Side::Right)])
            .collect();
        slots.shuffle(&mut self.rng);
        self.obs.discs = EdgeDiscs::new();
        for &(row, side) in slots.iter().take(self.config.discs) {
            self.obs.discs.set(row, side, true);
        }
        self.sync_sprites();
    }

    fn sync_sprites(&mut self) {
        self.obs.enemies = Default::default();
        if let Some(cell) = self.enemy {
            self.obs.enemies.set(cell, true);
        }
        self.obs.friendlies = Default::default();
        if let Some(cell) = self.friendly {
            self.obs.friendlies.set(cell, true);
        }
    }

    fn step_enemy(&mut self) {
        let Some(enemy) = self.enemy else {
            if self.enemy_timer > 0 {
                self.enemy_timer -= 1;
            } else {
                let entries: Vec<Cell> = [Move::Down, Move::Right]
                    .iter()
                    .filter_map(|&m| Cell::TOP.neighbor(m))
                    .filter(|&cell| cell != self.obs.position)
                    .collect();
                self.enemy = entries.choose(&mut self.rng).copied();
            }
            return;
        };

        let mut options: Vec<Cell> = enemy.neighbors().map(|(_, cell)| cell).collect();
        options.shuffle(&mut self.rng);
        let target = self.obs.position;
        let next = if self.rng.random::<f64>() < self.config.chase_probability {
            options
                .iter()
                .copied()
                .min_by_key(|&cell| hop_distance(cell, target))
        } else {
            options.first().copied()
        };
        self.enemy = next.or(Some(enemy));
    }

    fn step_friendly(&mut self) {
        match self.friendly {
            Some(ball) => {
                let below: Vec<Cell> = [Move::Down, Move::Right]
                    .iter()
                    .filter_map(|&m| ball.neighbor(m))
                    .collect();
                self.friendly = below.choose(&mut self.rng).copied();
            }
            None => {
                if self.rng.random::<f64>() < self.config.friendly_chance {
                    let row1: Vec<Cell> = Cell::all().filter(|c| c.row() == 1).collect();
                    self.friendly = row1.choose(&mut self.rng).copied();
                }
            }
        }
    }

    fn lose_life(&mut self, reward: &mut StepReward) {
        reward.enemy_penalty += DEATH_PENALTY;
        self.obs.lives = self.obs.lives.saturating_sub(1);
        self.enemy = None;
        self.enemy_timer = self.config.enemy_delay;
        self.friendly = None;
        debug!(lives = self.obs.lives, "caught by the pursuer");
    }

    /// Ride a disc beside `cell` if one is there; returns whether Qbert rode.
    fn ride_disc(&mut self, cell: Cell) -> bool {
        let side = if cell.is_left_edge() && self.obs.discs.get(cell.row(), Side::Left) {
            Side::Left
        } else if cell.is_right_edge() && self.obs.discs.get(cell.row(), Side::Right) {
            Side::Right
        } else {
            return false;
        };
        self.obs.discs.set(cell.row(), side, false);
        self.obs.position = Cell::TOP;
        true
    }
}

impl Environment for BoardSimulator {
    fn reset(&mut self) -> Result<Observation> {
        self.obs = Observation::new(self.config.lives);
        self.steps = 0;
        self.game_over = false;
        self.start_level();
        Ok(self.obs.clone())
    }

    fn observe(&self) -> Observation {
        self.obs.clone()
    }

    fn perform(&mut self, action: Move) -> Result<StepReward> {
        let from = self.obs.position;
        let target = from.neighbor(action).ok_or_else(|| Error::IllegalMove {
            action: action.to_string(),
            cell: from.to_string(),
        })?;
        let mut reward = StepReward::zero();
        if self.game_over {
            self.obs.reward = reward;
            return Ok(reward);
        }
        self.steps += 1;
        self.obs.position = target;

        if !self.obs.colored.get(target) {
            self.obs.colored.set(target, true);
            reward.block += BLOCK_POINTS;
        }
        if self.friendly == Some(target) {
            reward.friendly += FRIENDLY_POINTS;
            self.friendly = None;
        }

        let pursued = self.enemy.is_some_and(|enemy| hop_distance(enemy, target) <= 1);
        if pursued && self.ride_disc(target) {
            reward.enemy += LURE_POINTS;
            self.enemy = None;
            self.enemy_timer = self.config.enemy_delay;
            debug!("pursuer lured off the pyramid");
        } else if self.enemy == Some(target) {
            self.lose_life(&mut reward);
        } else {
            self.step_enemy();
            if self.enemy == Some(self.obs.position) {
                self.lose_life(&mut reward);
            }
        }

        self.step_friendly();
        if self.friendly == Some(self.obs.position) {
            reward.friendly += FRIENDLY_POINTS;
            self.friendly = None;
        }

        if self.obs.level_complete() {
            reward.block += self.config.level_bonus;
            self.obs.level += 1;
            debug!(level = self.obs.level, "level complete");
            self.start_level();
        }

        self.sync_sprites();
        if self.obs.lives == 0 || self.config.max_steps.is_some_and(|cap| self.steps >= cap) {
            self.game_over = true;
        }
        self.obs.reward = reward;
        Ok(reward)
    }

    fn is_game_over(&self) -> bool {
        self.game_over
    }
}
