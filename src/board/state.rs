//! Game state representation.
//!
//! Holds everything that changes during a match: who owns each region and
//! with how many armies, both players' allotments, the round and turn
//! counters, the current phase, the pool of pickable starting regions, and
//! the match's seeded random stream. The region graph itself is shared and
//! never mutated.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::map::{ContinentId, MapError, MapGraph, RegionId};
use super::player::{Owner, Player, Seat};
use crate::config::{ConfigError, GameConfig};
use crate::resolve::phase::{next_phase, PhaseEvent};

/// Armies on every region before anyone claims it.
pub const NEUTRAL_ARMIES: u32 = 2;

/// Regions offered per continent when building the pickable pool.
pub const PICKABLE_PER_CONTINENT: usize = 2;

/// The phase of the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Setup,
    PlaceArmies,
    AttackTransfer,
    GameOver,
}

impl Phase {
    /// Wire name used in status lines.
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::PlaceArmies => "place_armies",
            Phase::AttackTransfer => "attack/transfer",
            Phase::GameOver => "game_over",
        }
    }
}

/// Misuse of the engine by the calling layer. These abort the current
/// operation; they are never caused by bot text alone.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("region {0} is not pickable")]
    NotPickable(RegionId),

    #[error("{action} is not allowed during {}", .phase.name())]
    WrongPhase { action: &'static str, phase: Phase },

    #[error(transparent)]
    Map(#[from] MapError),
}

/// Dynamic facet of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionState {
    pub owner: Owner,
    pub armies: u32,
}

/// Complete state of one match.
#[derive(Debug, Clone)]
pub struct GameState<R = SmallRng> {
    pub config: GameConfig,
    map: Arc<MapGraph>,
    regions: BTreeMap<RegionId, RegionState>,
    players: [Player; 2],
    pub(crate) round: u32,
    pub(crate) turn: Seat,
    pub(crate) phase: Phase,
    pickable: Vec<RegionId>,
    rng: R,
}

impl GameState<SmallRng> {
    /// Starts a new match in the setup phase, seeded from `config.seed` (or
    /// entropy when unset), with the pickable pool already drawn.
    pub fn new(config: GameConfig, map: Arc<MapGraph>) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self::with_rng(config, map, rng)
    }
}

impl<R: Rng> GameState<R> {
    /// Starts a new match drawing from the given random stream.
    pub fn with_rng(
        config: GameConfig,
        map: Arc<MapGraph>,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let regions = map
            .regions()
            .map(|r| {
                (
                    r.id,
                    RegionState {
                        owner: Owner::Neutral,
                        armies: NEUTRAL_ARMIES,
                    },
                )
            })
            .collect();
        let mut state = GameState {
            config,
            map,
            regions,
            players: [Player::for_seat(Seat::One), Player::for_seat(Seat::Two)],
            round: 1,
            turn: Seat::One,
            phase: Phase::Setup,
            pickable: Vec::new(),
            rng,
        };
        state.recalculate_starting_armies();
        state.init_starting_regions();
        Ok(state)
    }

    /// Draws the pickable pool: two distinct regions from every continent,
    /// continents visited in id order.
    pub fn init_starting_regions(&mut self) {
        let mut pool = Vec::new();
        for continent in self.map.continents() {
            let mut remaining = continent.regions().to_vec();
            for _ in 0..PICKABLE_PER_CONTINENT.min(remaining.len()) {
                let idx = self.rng.gen_range(0..remaining.len());
                pool.push(remaining.remove(idx));
            }
        }
        self.pickable = pool;
    }

    /// Gives `region` to the player whose turn it is and passes the turn.
    ///
    /// Once each player holds their quota of starting regions, or the pool
    /// runs dry, the match moves on to seat one's first placement.
    pub fn choose_region(&mut self, region: RegionId) -> Result<(), GameError> {
        if self.phase != Phase::Setup {
            return Err(GameError::WrongPhase {
                action: "choose_region",
                phase: self.phase,
            });
        }
        let idx = self
            .pickable
            .iter()
            .position(|r| *r == region)
            .ok_or(GameError::NotPickable(region))?;
        let seat = self.turn;
        self.region_mut(region)?.owner = Owner::Player(seat);
        self.pickable.remove(idx);
        self.turn = seat.other();
        log::debug!("player {} picked region {}", seat, region);

        let quota = self.config.starting_regions_per_player;
        let done = self.pickable.is_empty()
            || [Seat::One, Seat::Two]
                .iter()
                .all(|s| self.owned_regions(*s).count() >= quota);
        if done {
            self.start_play()?;
        }
        Ok(())
    }

    /// Ends setup: seat one starts placing in round one.
    ///
    /// Also used by hosts that load a position with [`GameState::set_region`]
    /// instead of running the pick sequence.
    pub fn start_play(&mut self) -> Result<(), GameError> {
        self.phase = self.transition("start_play", PhaseEvent::SetupComplete)?;
        self.pickable.clear();
        self.round = 1;
        self.turn = Seat::One;
        self.recalculate_starting_armies();
        log::info!(
            "setup complete: player 1 holds {} regions, player 2 holds {}",
            self.owned_regions(Seat::One).count(),
            self.owned_regions(Seat::Two).count()
        );
        if self.is_done() {
            self.phase = Phase::GameOver;
        }
        Ok(())
    }

    /// Recomputes both players' allotments from the current board.
    pub fn recalculate_starting_armies(&mut self) {
        let base = self.config.starting_armies;
        for seat in [Seat::One, Seat::Two] {
            let mut armies = if seat == Seat::One && self.round <= 1 {
                base / 2
            } else {
                base
            };
            for continent in self.map.continents() {
                if self.continent_owner(continent.id) == Some(seat) {
                    armies += continent.reward;
                }
            }
            self.players[seat.index()].armies_per_turn = armies;
        }
    }

    pub(crate) fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Applies a phase event through the state machine.
    pub(crate) fn transition(
        &self,
        action: &'static str,
        event: PhaseEvent,
    ) -> Result<Phase, GameError> {
        next_phase(self.phase, event).ok_or(GameError::WrongPhase {
            action,
            phase: self.phase,
        })
    }
}

impl<R> GameState<R> {
    pub fn map(&self) -> &MapGraph {
        &self.map
    }

    /// Shared handle to the region graph.
    pub fn map_handle(&self) -> Arc<MapGraph> {
        Arc::clone(&self.map)
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Seat whose move it is.
    pub fn turn(&self) -> Seat {
        self.turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    /// Player whose move it is.
    pub fn active_player(&self) -> &Player {
        self.player(self.turn)
    }

    /// Seat of the player with the given id.
    pub fn seat_of(&self, player_id: &str) -> Option<Seat> {
        [Seat::One, Seat::Two]
            .into_iter()
            .find(|s| self.players[s.index()].id == player_id)
    }

    /// Replaces the identity of a seat. Allotments are kept.
    pub fn set_player(&mut self, seat: Seat, id: impl Into<String>, name: impl Into<String>) {
        let p = &mut self.players[seat.index()];
        p.id = id.into();
        p.name = name.into();
    }

    /// Regions still on offer during setup, in draw order.
    pub fn pickable(&self) -> &[RegionId] {
        &self.pickable
    }

    pub fn is_pickable(&self, region: RegionId) -> bool {
        self.pickable.contains(&region)
    }

    pub fn region(&self, id: RegionId) -> Result<RegionState, MapError> {
        self.regions
            .get(&id)
            .copied()
            .ok_or(MapError::RegionNotFound(id))
    }

    pub(crate) fn region_mut(&mut self, id: RegionId) -> Result<&mut RegionState, MapError> {
        self.regions
            .get_mut(&id)
            .ok_or(MapError::RegionNotFound(id))
    }

    /// Overwrites a region's owner and army count. Intended for loading a
    /// position before [`GameState::start_play`].
    pub fn set_region(&mut self, id: RegionId, owner: Owner, armies: u32) -> Result<(), MapError> {
        *self.region_mut(id)? = RegionState { owner, armies };
        Ok(())
    }

    /// Every region's dynamic state in ascending id order.
    pub fn region_states(&self) -> impl Iterator<Item = (RegionId, RegionState)> + '_ {
        self.regions.iter().map(|(id, s)| (*id, *s))
    }

    /// Regions held by `seat`, in ascending id order.
    pub fn owned_regions(&self, seat: Seat) -> impl Iterator<Item = RegionId> + '_ {
        self.regions
            .iter()
            .filter(move |(_, s)| s.owner == Owner::Player(seat))
            .map(|(id, _)| *id)
    }

    pub fn owned_by(&self, region: RegionId, seat: Seat) -> bool {
        self.regions
            .get(&region)
            .is_some_and(|s| s.owner == Owner::Player(seat))
    }

    /// The seat holding every region of a continent, if any.
    pub fn continent_owner(&self, continent: ContinentId) -> Option<Seat> {
        let cont = self.map.continent(continent).ok()?;
        let (first, rest) = cont.regions().split_first()?;
        let seat = self.regions.get(first)?.owner.seat()?;
        rest.iter()
            .all(|r| self.owned_by(*r, seat))
            .then_some(seat)
    }

    /// Fog of war: a player sees the regions it owns and their neighbors.
    pub fn is_visible_to(&self, region: RegionId, seat: Seat) -> bool {
        if self.owned_by(region, seat) {
            return true;
        }
        self.map
            .region(region)
            .map(|r| r.neighbors().any(|n| self.owned_by(n, seat)))
            .unwrap_or(false)
    }

    /// The surviving player once the other holds no regions. Always `None`
    /// during setup.
    pub fn winning_player(&self) -> Option<Seat> {
        if self.phase == Phase::Setup {
            return None;
        }
        [Seat::One, Seat::Two]
            .into_iter()
            .find(|s| self.owned_regions(*s).next().is_none())
            .map(Seat::other)
    }

    /// True once a player is eliminated or the round limit is passed.
    pub fn is_done(&self) -> bool {
        self.winning_player().is_some() || self.round > self.config.max_rounds
    }
}
