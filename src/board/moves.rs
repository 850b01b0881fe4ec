//! Move types for the setup, placement, and attack/transfer phases.
//!
//! Moves are created fresh from bot text each turn and judged exactly once.
//! A judgement never edits the move in place: the rules engine returns a
//! [`Judged`] record pairing the move (with any clamped army count) and its
//! [`Legality`].

use std::fmt;

use super::map::RegionId;

/// Claim of a starting region during setup: a bare `<regionId>` token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionChoice {
    pub player: String,
    pub region: RegionId,
}

/// Reinforcement: `place_armies <region> <armies>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceArmies {
    pub player: String,
    pub region: RegionId,
    /// Requested count. May be clamped down by the engine, never up.
    pub armies: i32,
}

/// Attack or transfer: `attack/transfer <from> <to> <armies>`.
///
/// Whether it is an attack or a transfer is decided at application time by
/// the owner of `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttackTransfer {
    pub player: String,
    pub from: RegionId,
    pub to: RegionId,
    pub armies: i32,
}

/// Any move a bot can submit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Move {
    RegionChoice(RegionChoice),
    PlaceArmies(PlaceArmies),
    AttackTransfer(AttackTransfer),
}

impl Move {
    /// Id of the player that issued the move.
    pub fn player(&self) -> &str {
        match self {
            Move::RegionChoice(m) => &m.player,
            Move::PlaceArmies(m) => &m.player,
            Move::AttackTransfer(m) => &m.player,
        }
    }
}

impl From<PlaceArmies> for Move {
    fn from(m: PlaceArmies) -> Self {
        Move::PlaceArmies(m)
    }
}

impl From<AttackTransfer> for Move {
    fn from(m: AttackTransfer) -> Self {
        Move::AttackTransfer(m)
    }
}

impl From<RegionChoice> for Move {
    fn from(m: RegionChoice) -> Self {
        Move::RegionChoice(m)
    }
}

/// Splits a parsed batch into its placement and attack/transfer parts,
/// preserving submission order within each part. Region choices are dropped.
pub fn split_moves(moves: Vec<Move>) -> (Vec<PlaceArmies>, Vec<AttackTransfer>) {
    let mut place = Vec::new();
    let mut attack = Vec::new();
    for m in moves {
        match m {
            Move::PlaceArmies(p) => place.push(p),
            Move::AttackTransfer(a) => attack.push(a),
            Move::RegionChoice(_) => {}
        }
    }
    (place, attack)
}

/// Outcome of validating a move.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Legality {
    Accepted,
    /// Rejected with a human-readable reason.
    Rejected(String),
}

impl Legality {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Legality::Accepted)
    }

    /// The rejection reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Legality::Accepted => None,
            Legality::Rejected(r) => Some(r),
        }
    }
}

impl fmt::Display for Legality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Legality::Accepted => write!(f, "accepted"),
            Legality::Rejected(r) => write!(f, "rejected: {}", r),
        }
    }
}

/// A move together with the engine's verdict on it.
///
/// For accepted moves `mv.armies` holds the count actually applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judged<M> {
    pub mv: M,
    pub legality: Legality,
}

impl<M> Judged<M> {
    pub fn accepted(mv: M) -> Self {
        Judged {
            mv,
            legality: Legality::Accepted,
        }
    }

    pub fn rejected(mv: M, reason: impl Into<String>) -> Self {
        Judged {
            mv,
            legality: Legality::Rejected(reason.into()),
        }
    }
}
