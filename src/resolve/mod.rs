//! Turn processing.
//!
//! Validates a player's moves for the current phase, applies the legal ones
//! to the game state, resolves combat, and advances the phase machine.

pub mod attack;
pub mod combat;
pub mod phase;
pub mod place;

use crate::board::map::RegionId;
use crate::board::moves::{Judged, Move};

pub use attack::{attack_transfer, validate_attack_transfers};
pub use combat::{resolve, CombatMode, CombatOdds, FightResult, FightSide};
pub use phase::{next_phase, PhaseEvent};
pub use place::place_armies;

/// A fight that took place while applying an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Battle {
    pub from: RegionId,
    pub to: RegionId,
    pub attacking: u32,
    pub defending: u32,
    pub result: FightResult,
}

/// Everything a phase produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport<M> {
    /// One entry per submitted move, in submission order.
    pub judged: Vec<Judged<M>>,
    /// Applied moves the opponent can see, in application order.
    pub observed: Vec<Move>,
    /// Fights in the order they were resolved.
    pub battles: Vec<Battle>,
}

impl<M> PhaseReport<M> {
    pub(crate) fn new() -> Self {
        PhaseReport {
            judged: Vec::new(),
            observed: Vec::new(),
            battles: Vec::new(),
        }
    }

    /// Moves that were rejected, with their reasons.
    pub fn rejected(&self) -> impl Iterator<Item = (&M, &str)> + '_ {
        self.judged
            .iter()
            .filter_map(|j| j.legality.reason().map(|r| (&j.mv, r)))
    }

    pub fn accepted(&self) -> impl Iterator<Item = &M> + '_ {
        self.judged
            .iter()
            .filter(|j| j.legality.is_accepted())
            .map(|j| &j.mv)
    }
}
