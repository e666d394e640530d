//! Observation → abstracted state mapping for one sub-policy

use serde::{Deserialize, Serialize};

use super::{
    repr::{PolicyKind, StateRepr},
    state::AbstractState,
};
use crate::board::{BlockGrid, Cell, Move, Observation};

/// Neighbor code: ordinary block.
pub const PLAIN: u8 = 0;
/// Neighbor code: edge block with a disc beside it.
pub const DISC: u8 = 1;
/// Neighbor code: block occupied by or adjacent to an enemy.
pub const DANGER: u8 = 2;
/// Cap on the `along_direction` count.
pub const MAX_RUN: u8 = 3;

/// Reduces observations for one sub-policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAbstractor {
    repr: StateRepr,
    concern: PolicyKind,
}

impl StateAbstractor {
    pub fn new(repr: StateRepr, concern: PolicyKind) -> Self {
        Self { repr, concern }
    }

    /// Abstractor with the policy's default representation.
    pub fn for_policy(concern: PolicyKind) -> Self {
        Self::new(concern.default_repr(), concern)
    }

    pub fn repr(&self) -> StateRepr {
        self.repr
    }

    pub fn concern(&self) -> PolicyKind {
        self.concern
    }

    pub fn abstract_state(&self, obs: &Observation) -> AbstractState {
        let here = obs.position;
        match self.repr {
            StateRepr::Simple => AbstractState::Local {
                position: Some(here),
                neighbors: slots(here, |_, cell| u8::from(self.raw_flag(obs, cell))),
            },
            StateRepr::Adjacent => AbstractState::Local {
                position: None,
                neighbors: slots(here, |_, cell| self.adjacent_count(obs, here, cell)),
            },
            StateRepr::AdjacentConservative => AbstractState::Local {
                position: None,
                neighbors: slots(here, |_, cell| conservative_code(obs, cell)),
            },
            StateRepr::AlongDirection => AbstractState::Local {
                position: None,
                neighbors: slots(here, |m, _| self.run_length(obs, here, m)),
            },
            StateRepr::Verbose => AbstractState::Verbose {
                position: here,
                colored: obs.colored,
                agents: agent_grid(obs),
            },
        }
    }

    /// The flag `simple` reports: color for blocks, occupancy for agents.
    fn raw_flag(&self, obs: &Observation, cell: Cell) -> bool {
        match self.concern {
            PolicyKind::Block => obs.colored.get(cell),
            PolicyKind::Enemy => obs.enemies.get(cell),
            PolicyKind::Friendly => obs.friendlies.get(cell),
        }
    }

    /// The feature density flavors count: uncolored blocks or occupied blocks.
    fn is_target(&self, obs: &Observation, cell: Cell) -> bool {
        match self.concern {
            PolicyKind::Block => !obs.colored.get(cell),
            PolicyKind::Enemy => obs.enemies.get(cell),
            PolicyKind::Friendly => obs.friendlies.get(cell),
        }
    }

    fn adjacent_count(&self, obs: &Observation, here: Cell, neighbor: Cell) -> u8 {
        let count = std::iter::once(neighbor)
            .chain(neighbor.neighbors().map(|(_, cell)| cell))
            .filter(|&cell| cell != here && self.is_target(obs, cell))
            .count();
        count as u8
    }

    fn run_length(&self, obs: &Observation, here: Cell, m: Move) -> u8 {
        let mut count = 0u8;
        let mut cell = here;
        while let Some(next) = cell.neighbor(m) {
            if self.is_target(obs, next) {
                count += 1;
            }
            cell = next;
        }
        count.min(MAX_RUN)
    }
}

/// Fill the four neighbor slots, leaving illegal directions empty.
fn slots(here: Cell, mut code: impl FnMut(Move, Cell) -> u8) -> [Option<u8>; 4] {
    let mut neighbors = [None; 4];
    for m in Move::SLOTS {
        neighbors[m.slot()] = here.neighbor(m).map(|cell| code(m, cell));
    }
    neighbors
}

fn conservative_code(obs: &Observation, cell: Cell) -> u8 {
    let threatened =
        obs.enemies.get(cell) || cell.neighbors().any(|(_, other)| obs.enemies.get(other));
    if threatened {
        DANGER
    } else if obs.discs.beside(cell) {
        DISC
    } else {
        PLAIN
    }
}

fn agent_grid(obs: &Observation) -> BlockGrid<i8> {
    let mut agents = BlockGrid::new();
    for cell in Cell::all() {
        let code = if obs.enemies.get(cell) {
            -1
        } else if obs.friendlies.get(cell) {
            1
        } else {
            0
        };
        agents.set(cell, code);
    }
    agents
}
