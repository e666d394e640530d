//! The frame-parsing world: turns an emulator into a symbolic environment

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::frame::{Frame, FrameParser, ParsedFrame};
use crate::{
    Result,
    board::{Action, Cell, DEATH_PENALTY, Move, Observation, StepReward},
    error::Error,
    ports::{Emulator, Environment},
};

/// Frames to wait for Qbert to land before giving up on a move.
pub const MAX_SETTLE_FRAMES: usize = 1_000;

/// RAM bytes that confirm Qbert has landed: the low bit of `flag` set and
/// `idle` at zero.
///
/// This is part of the [`Emulator`] contract: an emulator whose memory map
/// differs from the default addresses must be paired with its own probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RamProbe {
    pub flag: usize,
    pub idle: usize,
}

impl RamProbe {
    /// Default flag byte address.
    pub const FLAG_BYTE: usize = 0;
    /// Default idle byte address; non-zero while a hop animates.
    pub const IDLE_BYTE: usize = 33;

    fn holds(&self, ram: &[u8]) -> bool {
        let flag = ram.get(self.flag).is_some_and(|&byte| byte & 1 == 1);
        let idle = ram.get(self.idle).is_some_and(|&byte| byte == 0);
        flag && idle
    }
}

impl Default for RamProbe {
    fn default() -> Self {
        Self {
            flag: Self::FLAG_BYTE,
            idle: Self::IDLE_BYTE,
        }
    }
}

/// Frame-parsing world configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub max_settle_frames: usize,
    /// Landing check against console memory, on top of the sprite check.
    /// `None` trusts the screen alone.
    pub ram_probe: Option<RamProbe>,
    /// Penalty per lost life, reported on the enemy channel.
    pub death_penalty: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_settle_frames: MAX_SETTLE_FRAMES,
            ram_probe: Some(RamProbe::default()),
            death_penalty: DEATH_PENALTY,
        }
    }
}

/// Split a raw score delta into reward channels.
pub fn classify_reward(delta: i64) -> StepReward {
    let mut reward = StepReward::zero();
    match delta {
        d if d <= 0 => {}
        25 => reward.block = 25,
        100 | 300 => reward.friendly = delta,
        500 => reward.enemy = 500,
        // level bonuses and anything unrecognised
        _ => reward.block = delta,
    }
    reward
}

/// [`Environment`] over any [`Emulator`], read through its screen.
pub struct QbertWorld<E: Emulator> {
    emulator: E,
    config: WorldConfig,
    frame: Frame,
    parser: FrameParser,
    obs: Observation,
}

impl<E: Emulator> QbertWorld<E> {
    pub fn new(emulator: E, config: WorldConfig) -> Self {
        let (width, height) = emulator.screen_dims();
        let lives = emulator.lives();
        Self {
            emulator,
            config,
            frame: Frame::new(width, height),
            parser: FrameParser::new(),
            obs: Observation::new(lives),
        }
    }

    pub fn emulator(&self) -> &E {
        &self.emulator
    }

    pub fn into_inner(self) -> E {
        self.emulator
    }

    fn landed(&self, target: Cell) -> bool {
        self.parser.qbert_at(&self.frame, target)
            && self
                .config
                .ram_probe
                .is_none_or(|probe| probe.holds(self.emulator.ram()))
    }

    /// Idle until Qbert appears on the top block.
    fn wait_for_start(&mut self) -> Result<()> {
        for _ in 0..self.config.max_settle_frames {
            self.emulator.screen_rgb(&mut self.frame)?;
            if self.landed(Cell::TOP) {
                return Ok(());
            }
            self.emulator.act(Action::Noop)?;
        }
        warn!(
            frames = self.config.max_settle_frames,
            "qbert never appeared on the top block"
        );
        Ok(())
    }

    fn apply(&mut self, parsed: ParsedFrame) {
        self.obs.colored = parsed.colored;
        self.obs.enemies = parsed.enemies;
        self.obs.friendlies = parsed.friendlies;
        self.obs.discs = parsed.discs;
        self.obs.lives = self.emulator.lives();
    }
}

impl<E: Emulator> Environment for QbertWorld<E> {
    fn reset(&mut self) -> Result<Observation> {
        self.emulator.reset()?;
        self.parser = FrameParser::new();
        self.wait_for_start()?;
        self.obs = Observation::new(self.emulator.lives());
        let parsed = self.parser.parse(&self.frame);
        self.apply(parsed);
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
        let was_complete = self.obs.level_complete();
        let lives_before = self.emulator.lives();

        // The move is pressed for one frame only; holding it would start
        // another hop as soon as Qbert lands.
        let mut reward = classify_reward(self.emulator.act(action.action())?);
        let mut landed = false;
        let mut frames = 0;
        while frames < self.config.max_settle_frames {
            self.emulator.screen_rgb(&mut self.frame)?;
            if self.landed(target) {
                landed = true;
                break;
            }
            if self.emulator.is_game_over() || self.emulator.lives() < lives_before {
                break;
            }
            reward += classify_reward(self.emulator.act(Action::Noop)?);
            frames += 1;
        }

        let lives_after = self.emulator.lives();
        let lost = lives_before.saturating_sub(lives_after);
        if lost > 0 {
            reward.enemy_penalty += self.config.death_penalty * f64::from(lost);
        } else if !landed && !self.emulator.is_game_over() {
            warn!(%from, %target, frames, "move did not settle");
        }

        if landed {
            self.obs.position = target;
        }
        let parsed = self.parser.parse(&self.frame);
        self.apply(parsed);

        if self.obs.level_complete() && !was_complete {
            self.obs.level += 1;
            self.obs.position = Cell::TOP;
            debug!(level = self.obs.level, "level complete");
        }
        if self.emulator.is_game_over() {
            self.obs.position = Cell::TOP;
        }

        self.obs.reward = reward;
        Ok(reward)
    }

    fn is_game_over(&self) -> bool {
        self.emulator.is_game_over()
    }
}
