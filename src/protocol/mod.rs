//! Text protocol handling.
//!
//! This module implements parsing and serialization for the line-based
//! protocol spoken between the referee, its host, and the bots: bot move
//! notation, the setup and map-update streams, and the referee's command
//! parser.

pub mod moves;
pub mod parser;
pub mod setup;

pub use moves::{
    format_move, format_moves, format_opponent_moves, parse_move, parse_moves,
    parse_starting_region, ParseError, ParsedMoves, MAX_MOVES_PER_LINE,
};
pub use parser::{parse_command, Command};
pub use setup::{
    apply_setup_line, format_map_update, format_pickable, format_setup, parse_map_update,
    parse_pickable, parse_setup, RegionUpdate, SetupError,
};
