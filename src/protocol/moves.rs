//! Bot move notation.
//!
//! A bot answers each phase with one line of comma-separated moves:
//!
//! ```text
//! place_armies 3 2, place_armies 7 1
//! attack/transfer 3 4 5, attack/transfer 7 8 1
//! ```
//!
//! During setup it answers with a bare region id instead. Bot text is
//! untrusted: every malformed token is reported and skipped, and the rest of
//! the line is still parsed.

use thiserror::Error;

use crate::board::map::{MapGraph, RegionId};
use crate::board::moves::{AttackTransfer, Move, PlaceArmies, RegionChoice};

/// Tokens past this count on a single line are dropped.
pub const MAX_MOVES_PER_LINE: usize = 50;

pub const PLACE_ARMIES: &str = "place_armies";
pub const ATTACK_TRANSFER: &str = "attack/transfer";

/// Why a single move token could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("bot's move format incorrect: '{0}'")]
    UnknownMove(String),

    #[error("region id input incorrect: '{0}'")]
    BadRegionId(String),

    #[error("unknown region {0}")]
    UnknownRegion(RegionId),

    #[error("number of armies input incorrect: '{0}'")]
    BadArmies(String),

    #[error("missing {expected} in '{input}'")]
    Missing {
        expected: &'static str,
        input: String,
    },
}

/// Result of parsing one line of bot output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMoves {
    /// Well-formed moves in submission order.
    pub moves: Vec<Move>,
    /// One entry per malformed token, in submission order.
    pub errors: Vec<ParseError>,
    /// Tokens ignored because the line exceeded [`MAX_MOVES_PER_LINE`].
    pub dropped: usize,
}

/// Parses a line of moves submitted by `player`.
///
/// Never fails: malformed tokens end up in `errors`, and the line is capped
/// at [`MAX_MOVES_PER_LINE`] tokens.
pub fn parse_moves(map: &MapGraph, input: &str, player: &str) -> ParsedMoves {
    let mut parsed = ParsedMoves::default();
    let input = input.trim();
    if input.len() <= 1 {
        return parsed;
    }

    for (i, token) in input.split(',').enumerate() {
        if i >= MAX_MOVES_PER_LINE {
            parsed.dropped += 1;
            continue;
        }
        match parse_move(map, token, player) {
            Ok(mv) => parsed.moves.push(mv),
            Err(e) => {
                log::warn!("parse error from {}: {}", player, e);
                parsed.errors.push(e);
            }
        }
    }
    if parsed.dropped > 0 {
        log::warn!(
            "{} sent more than {} moves; {} dropped",
            player,
            MAX_MOVES_PER_LINE,
            parsed.dropped
        );
    }
    parsed
}

/// Parses a single move token.
pub fn parse_move(map: &MapGraph, token: &str, player: &str) -> Result<Move, ParseError> {
    let token = token.trim();
    let parts: Vec<&str> = token.split_whitespace().collect();
    match parts.first().copied() {
        Some(PLACE_ARMIES) => {
            let region = parse_region(map, field(&parts, 1, "region id", token)?)?;
            let armies = parse_armies(field(&parts, 2, "army count", token)?)?;
            Ok(PlaceArmies {
                player: player.to_string(),
                region,
                armies,
            }
            .into())
        }
        Some(ATTACK_TRANSFER) => {
            let from = parse_region(map, field(&parts, 1, "source region id", token)?)?;
            let to = parse_region(map, field(&parts, 2, "destination region id", token)?)?;
            let armies = parse_armies(field(&parts, 3, "army count", token)?)?;
            Ok(AttackTransfer {
                player: player.to_string(),
                from,
                to,
                armies,
            }
            .into())
        }
        _ => Err(ParseError::UnknownMove(token.to_string())),
    }
}

/// Parses a starting-region answer: a single region id.
pub fn parse_starting_region(
    map: &MapGraph,
    input: &str,
    player: &str,
) -> Result<RegionChoice, ParseError> {
    let region = parse_region(map, input.trim())?;
    Ok(RegionChoice {
        player: player.to_string(),
        region,
    })
}

/// Formats a move in bot notation, without the player.
pub fn format_move(mv: &Move) -> String {
    match mv {
        Move::RegionChoice(m) => m.region.to_string(),
        Move::PlaceArmies(m) => format!("{} {} {}", PLACE_ARMIES, m.region, m.armies),
        Move::AttackTransfer(m) => {
            format!("{} {} {} {}", ATTACK_TRANSFER, m.from, m.to, m.armies)
        }
    }
}

/// Formats moves as a single comma-separated line that [`parse_moves`] accepts.
pub fn format_moves(moves: &[Move]) -> String {
    moves
        .iter()
        .map(format_move)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Formats the moves a player observed from the opponent:
/// `opponent_moves <player> <move>, <player> <move>`.
pub fn format_opponent_moves(moves: &[Move]) -> String {
    let body = moves
        .iter()
        .map(|m| format!("{} {}", m.player(), format_move(m)))
        .collect::<Vec<_>>()
        .join(", ");
    if body.is_empty() {
        "opponent_moves".to_string()
    } else {
        format!("opponent_moves {}", body)
    }
}

fn field<'a>(
    parts: &[&'a str],
    idx: usize,
    expected: &'static str,
    input: &str,
) -> Result<&'a str, ParseError> {
    parts.get(idx).copied().ok_or_else(|| ParseError::Missing {
        expected,
        input: input.to_string(),
    })
}

fn parse_region(map: &MapGraph, s: &str) -> Result<RegionId, ParseError> {
    let id = s
        .parse::<u32>()
        .map_err(|_| ParseError::BadRegionId(s.to_string()))?;
    let id = RegionId(id);
    if map.contains_region(id) {
        Ok(id)
    } else {
        Err(ParseError::UnknownRegion(id))
    }
}

fn parse_armies(s: &str) -> Result<i32, ParseError> {
    s.parse::<i32>()
        .map_err(|_| ParseError::BadArmies(s.to_string()))
}
