//! Board representation and game-state types.
//!
//! Contains the region graph, players and seats, the move model, and the
//! overall game state.

pub mod map;
pub mod moves;
pub mod player;
pub mod state;

pub use map::{Continent, ContinentId, MapError, MapGraph, Region, RegionId};
pub use moves::{split_moves, AttackTransfer, Judged, Legality, Move, PlaceArmies, RegionChoice};
pub use player::{Owner, Player, Seat};
pub use state::{GameError, GameState, Phase, RegionState};
