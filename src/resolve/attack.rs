//! Attack/transfer phase.
//!
//! Runs in two passes. Validation judges the whole batch against the board as
//! it stood when the phase began, accumulating how many armies each source
//! has already committed. Application then walks the accepted moves in order,
//! re-clamping each to what is actually left on its source, since earlier
//! fights may have thinned it.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::board::map::RegionId;
use crate::board::moves::{AttackTransfer, Judged, Legality};
use crate::board::player::Owner;
use crate::board::state::{GameError, GameState, Phase};

use super::combat::{self, FightSide};
use super::phase::end_turn;
use super::{Battle, PhaseReport};

/// Judges every move of the batch without touching the board.
///
/// A move is rejected when it comes from the wrong player, its source is not
/// owned by the active player, its destination does not border the source,
/// it moves fewer than one army, it would leave its source with no army once
/// combined with earlier accepted moves from the same source, or an earlier
/// move in the batch already used the same source and destination.
pub fn validate_attack_transfers<R>(
    state: &GameState<R>,
    moves: &[AttackTransfer],
) -> Vec<Legality> {
    let seat = state.turn();
    let id = &state.active_player().id;
    let mut total_from: HashMap<RegionId, u32> = HashMap::new();
    let mut seen: HashSet<(RegionId, RegionId)> = HashSet::new();
    let mut verdicts = Vec::with_capacity(moves.len());

    for mv in moves {
        let first_of_pair = seen.insert((mv.from, mv.to));
        let reason = match (state.region(mv.from), state.region(mv.to)) {
            (Err(_), _) => Some(format!("{} does not exist", mv.from)),
            (_, Err(_)) => Some(format!("{} does not exist", mv.to)),
            (Ok(from), Ok(_)) => {
                let committed = total_from.get(&mv.from).copied().unwrap_or(0);
                if mv.player != *id {
                    Some("move by wrong player".to_string())
                } else if from.owner != Owner::Player(seat) {
                    Some(format!("{} attack/transfer not owned", mv.from))
                } else if !state.map().is_neighbor(mv.from, mv.to) {
                    Some(format!("{} attack/transfer not a neighbor", mv.to))
                } else if mv.armies < 1 {
                    Some("attack/transfer cannot use less than 1 army".to_string())
                } else if u64::from(committed) + mv.armies as u64 >= u64::from(from.armies) {
                    Some(format!(
                        "{} attack/transfer has used all available armies",
                        mv.from
                    ))
                } else if !first_of_pair {
                    Some(format!(
                        "{} attack/transfer has already attacked/transfered to this region",
                        mv.from
                    ))
                } else {
                    *total_from.entry(mv.from).or_insert(0) += mv.armies as u32;
                    None
                }
            }
        };
        verdicts.push(match reason {
            Some(r) => Legality::Rejected(r),
            None => Legality::Accepted,
        });
    }
    verdicts
}

/// Validates and applies the active player's attacks and transfers, then
/// passes the turn.
///
/// Accepted moves into the player's own regions are transfers. Anything else
/// is an attack resolved with the configured combat mode, drawing from the
/// match's random stream in move order. Moves touching a region the opponent
/// can see are reported in `observed`.
pub fn attack_transfer<R: Rng>(
    state: &mut GameState<R>,
    moves: Vec<AttackTransfer>,
) -> Result<PhaseReport<AttackTransfer>, GameError> {
    if state.phase() != Phase::AttackTransfer {
        return Err(GameError::WrongPhase {
            action: "attack_transfer",
            phase: state.phase(),
        });
    }
    let verdicts = validate_attack_transfers(state, &moves);
    let seat = state.turn();
    let odds = state.config.odds;
    let mode = state.config.combat;
    let mut report = PhaseReport::new();

    for (mut mv, legality) in moves.into_iter().zip(verdicts) {
        if let Legality::Rejected(reason) = legality {
            log::debug!(
                "illegal attack/transfer {} {} {} by {}: {}",
                mv.from,
                mv.to,
                mv.armies,
                mv.player,
                reason
            );
            report.judged.push(Judged::rejected(mv, reason));
            continue;
        }

        let from = state.region(mv.from)?;
        let to = state.region(mv.to)?;
        let transfer = to.owner == Owner::Player(seat);
        let Some(armies) = usable_armies(mv.armies, from.armies, transfer) else {
            let reason = format!("{} attack/transfer only has 1 army", mv.from);
            log::debug!("illegal attack/transfer by {}: {}", mv.player, reason);
            report.judged.push(Judged::rejected(mv, reason));
            continue;
        };
        mv.armies = armies as i32;

        let other = seat.other();
        if state.is_visible_to(mv.from, other) || state.is_visible_to(mv.to, other) {
            report.observed.push(mv.clone().into());
        }

        if transfer {
            state.region_mut(mv.from)?.armies -= armies;
            state.region_mut(mv.to)?.armies += armies;
        } else {
            let result = combat::resolve(state.rng_mut(), armies, to.armies, odds, mode);
            match result.winner {
                FightSide::Attacker => {
                    state.region_mut(mv.from)?.armies -= armies;
                    let dest = state.region_mut(mv.to)?;
                    dest.owner = Owner::Player(seat);
                    dest.armies = armies - result.attackers_destroyed;
                }
                FightSide::Defender => {
                    state.region_mut(mv.from)?.armies -= result.attackers_destroyed;
                    state.region_mut(mv.to)?.armies -= result.defenders_destroyed;
                }
            }
            report.battles.push(Battle {
                from: mv.from,
                to: mv.to,
                attacking: armies,
                defending: to.armies,
                result,
            });
        }
        report.judged.push(Judged::accepted(mv));
    }

    end_turn(state);
    Ok(report)
}

/// Clamps a request to what its source can still spare. A transfer may end
/// up moving nothing; an attack needs at least one army.
fn usable_armies(requested: i32, source: u32, transfer: bool) -> Option<u32> {
    let armies = (requested.max(0) as u32).min(source.saturating_sub(1));
    (armies >= 1 || transfer).then_some(armies)
}
