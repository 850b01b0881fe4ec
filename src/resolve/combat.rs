//! Probabilistic combat resolution.
//!
//! Every attacking army has a chance to destroy one defender and every
//! defending army a chance to destroy one attacker. Two schedules exist:
//!
//! - [`CombatMode::Batch`]: all attacker draws, then all defender draws.
//! - [`CombatMode::Continual`]: alternating attacker/defender draws until one
//!   side has lost as many armies as it brought.
//!
//! Both share the same post-processing, which guarantees a decidable winner.
//! Resolution is a pure function of its inputs and the random stream.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default chance for an attacking army to destroy a defender.
pub const DEFAULT_DEFENDER_DESTROY_CHANCE: f64 = 0.6;

/// Default chance for a defending army to destroy an attacker.
pub const DEFAULT_ATTACKER_DESTROY_CHANCE: f64 = 0.7;

/// Draw schedule used to resolve a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatMode {
    #[default]
    #[serde(alias = "original")]
    Batch,
    Continual,
}

impl CombatMode {
    pub const fn name(self) -> &'static str {
        match self {
            CombatMode::Batch => "batch",
            CombatMode::Continual => "continual",
        }
    }
}

impl fmt::Display for CombatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CombatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "batch" | "original" => Ok(CombatMode::Batch),
            "continual" => Ok(CombatMode::Continual),
            other => Err(other.to_string()),
        }
    }
}

/// Per-army destruction probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatOdds {
    /// Chance that one attacking army destroys one defender.
    pub defender_destroy_chance: f64,
    /// Chance that one defending army destroys one attacker.
    pub attacker_destroy_chance: f64,
}

impl Default for CombatOdds {
    fn default() -> Self {
        CombatOdds {
            defender_destroy_chance: DEFAULT_DEFENDER_DESTROY_CHANCE,
            attacker_destroy_chance: DEFAULT_ATTACKER_DESTROY_CHANCE,
        }
    }
}

/// Side that won a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FightSide {
    Attacker,
    Defender,
}

/// Outcome of a single fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FightResult {
    pub winner: FightSide,
    pub attackers_destroyed: u32,
    pub defenders_destroyed: u32,
}

impl FightResult {
    /// Caps the raw losses and decides the winner.
    ///
    /// Losses never exceed the armies present. When the attackers are wiped
    /// out they cannot also take the region: if the defenders were wiped out
    /// too, one defender survives.
    fn settle(
        attackers_destroyed: u32,
        defenders_destroyed: u32,
        attacking: u32,
        defending: u32,
    ) -> Self {
        let mut attackers_destroyed = attackers_destroyed;
        let mut defenders_destroyed = defenders_destroyed.min(defending);
        if attackers_destroyed >= attacking {
            if defenders_destroyed >= defending {
                defenders_destroyed = defending.saturating_sub(1);
            }
            attackers_destroyed = attacking;
        }
        let winner = if defenders_destroyed >= defending {
            FightSide::Attacker
        } else {
            FightSide::Defender
        };
        FightResult {
            winner,
            attackers_destroyed,
            defenders_destroyed,
        }
    }
}

/// Resolves a fight between `attacking` and `defending` armies.
pub fn resolve<R: Rng + ?Sized>(
    rng: &mut R,
    attacking: u32,
    defending: u32,
    odds: CombatOdds,
    mode: CombatMode,
) -> FightResult {
    let (attackers_destroyed, defenders_destroyed) = match mode {
        CombatMode::Batch => batch_losses(rng, attacking, defending, odds),
        CombatMode::Continual => continual_losses(rng, attacking, defending, odds),
    };
    let result =
        FightResult::settle(attackers_destroyed, defenders_destroyed, attacking, defending);
    log::debug!("{} combat {} vs {}: {:?}", mode, attacking, defending, result);
    result
}

fn batch_losses<R: Rng + ?Sized>(
    rng: &mut R,
    attacking: u32,
    defending: u32,
    odds: CombatOdds,
) -> (u32, u32) {
    let mut defenders_destroyed = 0;
    for _ in 0..attacking {
        if rng.gen::<f64>() < odds.defender_destroy_chance {
            defenders_destroyed += 1;
        }
    }
    let mut attackers_destroyed = 0;
    for _ in 0..defending {
        if rng.gen::<f64>() < odds.attacker_destroy_chance {
            attackers_destroyed += 1;
        }
    }
    (attackers_destroyed, defenders_destroyed)
}

fn continual_losses<R: Rng + ?Sized>(
    rng: &mut R,
    attacking: u32,
    defending: u32,
    odds: CombatOdds,
) -> (u32, u32) {
    let mut attackers_destroyed = 0;
    let mut defenders_destroyed = 0;
    while attackers_destroyed < attacking && defenders_destroyed < defending {
        if rng.gen::<f64>() < odds.defender_destroy_chance {
            defenders_destroyed += 1;
        }
        if rng.gen::<f64>() < odds.attacker_destroy_chance {
            attackers_destroyed += 1;
        }
    }
    (attackers_destroyed, defenders_destroyed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// A stream whose every `f64` draw is exactly 0.5.
    fn halves() -> StepRng {
        StepRng::new(1 << 63, 0)
    }

    /// A stream whose every `f64` draw is 0.0 (always hits).
    fn zeros() -> StepRng {
        StepRng::new(0, 0)
    }

    #[test]
    fn half_stream_draws_half() {
        let mut rng = halves();
        assert_eq!(rng.gen::<f64>(), 0.5);
    }

    #[test]
    fn batch_five_against_three() {
        let result = resolve(&mut halves(), 5, 3, CombatOdds::default(), CombatMode::Batch);
        assert_eq!(result.winner, FightSide::Attacker);
        // All five attacker draws hit, but only three defenders exist.
        assert_eq!(result.defenders_destroyed, 3);
        assert_eq!(result.attackers_destroyed, 3);
    }

    #[test]
    fn continual_stops_when_a_side_is_exhausted() {
        let result = resolve(&mut halves(), 5, 3, CombatOdds::default(), CombatMode::Continual);
        // Three exchanges: both sides lose one army each time.
        assert_eq!(result.winner, FightSide::Attacker);
        assert_eq!(result.defenders_destroyed, 3);
        assert_eq!(result.attackers_destroyed, 3);
    }

    #[test]
    fn mutual_wipeout_favours_defender() {
        let result = resolve(&mut zeros(), 2, 2, CombatOdds::default(), CombatMode::Batch);
        assert_eq!(result.winner, FightSide::Defender);
        assert_eq!(result.attackers_destroyed, 2);
        assert_eq!(result.defenders_destroyed, 1);
    }

    #[test]
    fn continual_mutual_wipeout_favours_defender() {
        let result = resolve(&mut zeros(), 1, 1, CombatOdds::default(), CombatMode::Continual);
        assert_eq!(result.winner, FightSide::Defender);
        assert_eq!(result.attackers_destroyed, 1);
        assert_eq!(result.defenders_destroyed, 0);
    }

    #[test]
    fn empty_region_falls_without_a_fight() {
        let result = resolve(&mut halves(), 1, 0, CombatOdds::default(), CombatMode::Continual);
        assert_eq!(result.winner, FightSide::Attacker);
        assert_eq!(result.attackers_destroyed, 0);
    }

    #[test]
    fn misses_leave_defender_standing() {
        let odds = CombatOdds {
            defender_destroy_chance: 0.0,
            attacker_destroy_chance: 0.0,
        };
        let result = resolve(&mut halves(), 4, 2, odds, CombatMode::Batch);
        assert_eq!(result.winner, FightSide::Defender);
        assert_eq!(result.attackers_destroyed, 0);
        assert_eq!(result.defenders_destroyed, 0);
    }

    #[test]
    fn mode_names_parse() {
        assert_eq!("batch".parse::<CombatMode>(), Ok(CombatMode::Batch));
        assert_eq!("ORIGINAL".parse::<CombatMode>(), Ok(CombatMode::Batch));
        assert_eq!("continual".parse::<CombatMode>(), Ok(CombatMode::Continual));
        assert!("dice".parse::<CombatMode>().is_err());
    }

    proptest! {
        #[test]
        fn same_seed_same_result(seed in any::<u64>(), a in 1u32..40, d in 0u32..40, continual in any::<bool>()) {
            let mode = if continual { CombatMode::Continual } else { CombatMode::Batch };
            let odds = CombatOdds::default();
            let first = resolve(&mut SmallRng::seed_from_u64(seed), a, d, odds, mode);
            let second = resolve(&mut SmallRng::seed_from_u64(seed), a, d, odds, mode);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn losses_never_exceed_armies(seed in any::<u64>(), a in 1u32..40, d in 1u32..40, continual in any::<bool>()) {
            let mode = if continual { CombatMode::Continual } else { CombatMode::Batch };
            let mut rng = SmallRng::seed_from_u64(seed);
            let r = resolve(&mut rng, a, d, CombatOdds::default(), mode);
            prop_assert!(r.attackers_destroyed <= a);
            prop_assert!(r.defenders_destroyed <= d);
            prop_assert!(!(r.attackers_destroyed == a && r.defenders_destroyed >= d));
            if r.winner == FightSide::Defender {
                prop_assert!(r.defenders_destroyed < d);
            } else {
                prop_assert!(r.attackers_destroyed < a);
            }
        }
    }
}
