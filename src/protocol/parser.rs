//! Referee command parser.
//!
//! Parses the lines a host writes to the referee's stdin into structured
//! `Command` variants that the main loop can dispatch on. Bot text travels
//! inside `submit` commands untouched; it is parsed later against the map.

use crate::board::player::Seat;

/// A parsed host-to-referee command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; the referee replies `readyok`.
    IsReady,

    /// Forget the map, settings and match.
    NewGame,

    /// One line of the map description: `setup_map continents|regions|neighbors ...`.
    SetupMap { line: String },

    /// Override one config field: `settings <key> <value>`.
    Settings { key: String, value: String },

    /// Build the match from the map and settings received so far.
    Start,

    /// A bot's answer for the current phase: `submit <player> <text>`.
    Submit { player: String, text: String },

    /// Print the `update_map` line a seat would receive: `view <seat>`.
    View { seat: Seat },

    /// Print round, turn, phase and winner.
    Status,

    /// Terminate the referee.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let first = *tokens.first()?;

    match first {
        "isready" => Some(Command::IsReady),
        "newgame" => Some(Command::NewGame),
        "start" => Some(Command::Start),
        "status" => Some(Command::Status),
        "quit" => Some(Command::Quit),

        "setup_map" => Some(Command::SetupMap {
            line: trimmed.to_string(),
        }),
        "settings" => parse_settings(&tokens),
        "submit" => parse_submit(&tokens, trimmed),
        "view" => parse_view(&tokens),

        other => {
            log::warn!("unknown command: {}", other);
            None
        }
    }
}

/// Parses `settings <key> <value>`.
fn parse_settings(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 3 {
        log::warn!("malformed settings: expected 'settings <key> <value>'");
        return None;
    }
    Some(Command::Settings {
        key: tokens[1].to_string(),
        value: tokens[2].to_string(),
    })
}

/// Parses `submit <player> <text>`. The text may be empty: a bot that has
/// nothing to do still answers.
fn parse_submit(tokens: &[&str], full_line: &str) -> Option<Command> {
    let Some(player) = tokens.get(1) else {
        log::warn!("malformed submit: expected 'submit <player> <text>'");
        return None;
    };
    let text = full_line
        .strip_prefix("submit")
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix(player))
        .unwrap_or("")
        .trim()
        .to_string();
    Some(Command::Submit {
        player: player.to_string(),
        text,
    })
}

/// Parses `view <seat>`.
fn parse_view(tokens: &[&str]) -> Option<Command> {
    let seat = tokens
        .get(1)
        .and_then(|t| t.parse::<u8>().ok())
        .and_then(Seat::from_number);
    match seat {
        Some(seat) => Some(Command::View { seat }),
        None => {
            log::warn!("malformed view: expected 'view 1' or 'view 2'");
            None
        }
    }
}
