//! Phase sequencing logic.
//!
//! The match is a small state machine:
//!
//! - Setup          -> PlaceArmies (setup complete)
//! - PlaceArmies    -> AttackTransfer (armies placed, same player)
//! - AttackTransfer -> PlaceArmies (turn ended, other player) OR GameOver
//! - GameOver is terminal.
//!
//! Turn and round bookkeeping at the end of an attack/transfer phase lives in
//! [`end_turn`].

use rand::Rng;

use crate::board::player::Seat;
use crate::board::state::{GameState, Phase};

/// Something that happened which may move the match to another phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseEvent {
    SetupComplete,
    ArmiesPlaced,
    TurnEnded { game_done: bool },
}

/// Computes the phase reached from `phase` on `event`, or `None` if the event
/// cannot happen in that phase.
pub fn next_phase(phase: Phase, event: PhaseEvent) -> Option<Phase> {
    match (phase, event) {
        (Phase::Setup, PhaseEvent::SetupComplete) => Some(Phase::PlaceArmies),
        (Phase::PlaceArmies, PhaseEvent::ArmiesPlaced) => Some(Phase::AttackTransfer),
        (Phase::AttackTransfer, PhaseEvent::TurnEnded { game_done: false }) => {
            Some(Phase::PlaceArmies)
        }
        (Phase::AttackTransfer, PhaseEvent::TurnEnded { game_done: true }) => {
            Some(Phase::GameOver)
        }
        _ => None,
    }
}

/// Passes the turn after an attack/transfer phase.
///
/// Flips the turn, starts a new round when seat one is up again, recomputes
/// allotments from the live board, and enters either the next placement phase
/// or game over.
pub(crate) fn end_turn<R: Rng>(state: &mut GameState<R>) -> Phase {
    state.turn = state.turn.other();
    if state.turn == Seat::One {
        state.round += 1;
    }
    state.recalculate_starting_armies();
    let game_done = state.is_done();
    // end_turn is only reachable from AttackTransfer, where both events are defined.
    state.phase = next_phase(state.phase, PhaseEvent::TurnEnded { game_done })
        .unwrap_or(Phase::GameOver);
    if game_done {
        match state.winning_player() {
            Some(seat) => log::info!("game over in round {}: player {} wins", state.round, seat),
            None => log::info!("game over: round limit {} reached", state.config.max_rounds),
        }
    }
    state.phase
}
