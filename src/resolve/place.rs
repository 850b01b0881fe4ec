//! Placement phase.

use rand::Rng;

use crate::board::moves::{Judged, PlaceArmies};
use crate::board::player::Owner;
use crate::board::state::{GameError, GameState, Phase};

use super::phase::PhaseEvent;
use super::PhaseReport;

/// Applies the active player's placements in submission order.
///
/// Each placement is rejected without effect when it comes from the wrong
/// player, targets a region the player does not own, asks for fewer than one
/// army, or arrives after the allotment is spent. Otherwise it is clamped to
/// the armies left and applied. Placements on regions the opponent can see
/// are reported in `observed`.
///
/// The match then moves on to the same player's attack/transfer phase.
pub fn place_armies<R: Rng>(
    state: &mut GameState<R>,
    moves: Vec<PlaceArmies>,
) -> Result<PhaseReport<PlaceArmies>, GameError> {
    if state.phase() != Phase::PlaceArmies {
        return Err(GameError::WrongPhase {
            action: "place_armies",
            phase: state.phase(),
        });
    }
    let seat = state.turn();
    let id = state.active_player().id.clone();
    let mut left = state.active_player().armies_per_turn;
    let mut report = PhaseReport::new();

    for mut mv in moves {
        let Ok(region) = state.region(mv.region) else {
            report.judged.push(reject(mv.clone(), format!("{} does not exist", mv.region)));
            continue;
        };
        let verdict = if mv.player != id {
            Some("move by wrong player".to_string())
        } else if region.owner != Owner::Player(seat) {
            Some(format!("{} not owned", mv.region))
        } else if mv.armies < 1 {
            Some("cannot place less than 1 army".to_string())
        } else if left == 0 {
            Some("no armies left to place".to_string())
        } else {
            None
        };
        if let Some(reason) = verdict {
            report.judged.push(reject(mv, reason));
            continue;
        }

        let armies = (mv.armies as u32).min(left);
        left -= armies;
        state.region_mut(mv.region)?.armies += armies;
        mv.armies = armies as i32;

        if state.is_visible_to(mv.region, seat.other()) {
            report.observed.push(mv.clone().into());
        }
        report.judged.push(Judged::accepted(mv));
    }

    state.phase = state.transition("place_armies", PhaseEvent::ArmiesPlaced)?;
    Ok(report)
}

fn reject(mv: PlaceArmies, reason: String) -> Judged<PlaceArmies> {
    log::debug!("illegal place_armies {} {} by {}: {}", mv.region, mv.armies, mv.player, reason);
    Judged::rejected(mv, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::map::RegionId;
    use crate::board::player::Seat;
    use crate::resolve::test_support::position;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const P1: Owner = Owner::Player(Seat::One);
    const P2: Owner = Owner::Player(Seat::Two);

    fn place(player: &str, region: u32, armies: i32) -> PlaceArmies {
        PlaceArmies {
            player: player.to_string(),
            region: RegionId(region),
            armies,
        }
    }

    fn game() -> GameState<SmallRng> {
        // Seat one: allotment 2 in round one.
        position(
            SmallRng::seed_from_u64(1),
            &[(1, P1, 3), (2, P1, 1), (6, P2, 4)],
        )
    }

    #[test]
    fn places_and_moves_to_attack_phase() {
        let mut state = game();
        let report = place_armies(&mut state, vec![place("player1", 1, 2)]).unwrap();
        assert!(report.judged[0].legality.is_accepted());
        assert_eq!(state.region(RegionId(1)).unwrap().armies, 5);
        assert_eq!(state.phase(), Phase::AttackTransfer);
        assert_eq!(state.turn(), Seat::One);
        assert_eq!(state.round(), 1);
    }

    #[test]
    fn clamps_to_remaining_allotment() {
        let mut state = game();
        let report = place_armies(
            &mut state,
            vec![place("player1", 1, 1), place("player1", 2, 10), place("player1", 2, 1)],
        )
        .unwrap();
        assert_eq!(report.judged[1].mv.armies, 1);
        assert!(report.judged[1].legality.is_accepted());
        assert_eq!(
            report.judged[2].legality.reason(),
            Some("no armies left to place")
        );
        assert_eq!(state.region(RegionId(1)).unwrap().armies, 4);
        assert_eq!(state.region(RegionId(2)).unwrap().armies, 2);
    }

    #[test]
    fn rejects_without_mutation() {
        let mut state = game();
        let report = place_armies(
            &mut state,
            vec![
                place("player2", 1, 1),
                place("player1", 6, 1),
                place("player1", 1, 0),
                place("player1", 1, -4),
                place("player1", 42, 1),
            ],
        )
        .unwrap();
        let reasons: Vec<_> = report.rejected().map(|(_, r)| r.to_string()).collect();
        assert_eq!(
            reasons,
            vec![
                "move by wrong player",
                "6 not owned",
                "cannot place less than 1 army",
                "cannot place less than 1 army",
                "42 does not exist",
            ]
        );
        assert_eq!(state.region(RegionId(1)).unwrap().armies, 3);
        assert_eq!(state.region(RegionId(6)).unwrap().armies, 4);
    }

    #[test]
    fn visible_placements_are_observed() {
        let mut state = position(
            SmallRng::seed_from_u64(1),
            &[(1, P1, 3), (3, P1, 1), (4, P2, 4)],
        );
        let report = place_armies(
            &mut state,
            vec![place("player1", 1, 1), place("player1", 3, 1)],
        )
        .unwrap();
        // Region 3 borders region 4; region 1 is hidden from seat two.
        assert_eq!(report.observed, vec![place("player1", 3, 1).into()]);
    }

    #[test]
    fn wrong_phase_is_an_error() {
        let mut state = game();
        place_armies(&mut state, Vec::new()).unwrap();
        assert!(matches!(
            place_armies(&mut state, Vec::new()),
            Err(GameError::WrongPhase {
                action: "place_armies",
                phase: Phase::AttackTransfer
            })
        ));
    }
}
