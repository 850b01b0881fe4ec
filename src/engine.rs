//! Referee state management.
//!
//! Holds the map being described, the match settings, and once `start` is
//! received the running match. Every handler writes its protocol answer to
//! the given writer; diagnostics go through `log`.
//!
//! Output lines:
//!
//! ```text
//! pickable_starting_regions 1 3 4 6
//! go pick_starting_region player1
//! illegal player1 place_armies 6 1: 6 not owned
//! opponent_moves player1 attack/transfer 3 4 5
//! go place_armies player2
//! game_over player1
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use thiserror::Error;

use crate::board::map::MapGraph;
use crate::board::moves::{split_moves, AttackTransfer, Move, PlaceArmies};
use crate::board::player::Seat;
use crate::board::state::{GameError, GameState, Phase};
use crate::config::{ConfigError, GameConfig};
use crate::protocol::moves::{
    format_move, format_opponent_moves, parse_moves, parse_starting_region, ParseError,
};
use crate::protocol::setup::{apply_setup_line, format_map_update, format_pickable, SetupError};
use crate::resolve::{attack_transfer, place_armies, PhaseReport};

/// Errors reported back to the host as `error <message>`.
#[derive(Debug, Error)]
pub enum RefereeError {
    #[error("no match in progress")]
    NoMatch,

    #[error("match already started")]
    AlreadyStarted,

    #[error("unknown setting '{0}'")]
    UnknownSetting(String),

    #[error("invalid value '{value}' for setting {key}")]
    BadSetting { key: String, value: String },

    #[error("{player} cannot move now, waiting for {expected}")]
    NotYourTurn { player: String, expected: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Holds the referee's state between commands.
pub struct Referee {
    map: MapGraph,
    pub config: GameConfig,
    game: Option<GameState>,
}

impl Default for Referee {
    fn default() -> Self {
        Self::new()
    }
}

impl Referee {
    /// Creates a referee with an empty map and default settings.
    pub fn new() -> Self {
        Referee {
            map: MapGraph::new(),
            config: GameConfig::default(),
            game: None,
        }
    }

    /// Forgets the map, the settings and any match in progress.
    pub fn new_game(&mut self) {
        *self = Self::new();
    }

    /// The running match, if `start` has been received.
    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    /// Adds one `setup_map` line to the map.
    pub fn setup_map(&mut self, line: &str) -> Result<(), RefereeError> {
        if self.game.is_some() {
            return Err(RefereeError::AlreadyStarted);
        }
        apply_setup_line(&mut self.map, line)?;
        Ok(())
    }

    /// Overrides one config field by name.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<(), RefereeError> {
        if self.game.is_some() {
            return Err(RefereeError::AlreadyStarted);
        }
        let bad = || RefereeError::BadSetting {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "seed" => self.config.seed = Some(value.parse().map_err(|_| bad())?),
            "combat" => self.config.set_combat_mode(value)?,
            "starting_armies" => {
                self.config.starting_armies = value.parse().map_err(|_| bad())?
            }
            "max_rounds" => self.config.max_rounds = value.parse().map_err(|_| bad())?,
            "starting_regions_per_player" => {
                self.config.starting_regions_per_player = value.parse().map_err(|_| bad())?
            }
            "defender_destroy_chance" => {
                self.config.odds.defender_destroy_chance = value.parse().map_err(|_| bad())?
            }
            "attacker_destroy_chance" => {
                self.config.odds.attacker_destroy_chance = value.parse().map_err(|_| bad())?
            }
            other => return Err(RefereeError::UnknownSetting(other.to_string())),
        }
        Ok(())
    }

    /// Starts the match and announces the pickable pool.
    pub fn handle_start<W: Write>(&mut self, out: &mut W) -> Result<(), RefereeError> {
        if self.game.is_some() {
            return Err(RefereeError::AlreadyStarted);
        }
        let map = Arc::new(std::mem::take(&mut self.map));
        let game = match GameState::new(self.config.clone(), Arc::clone(&map)) {
            Ok(game) => game,
            Err(e) => {
                // Keep the map so the host can fix the settings and retry.
                self.map = Arc::try_unwrap(map).unwrap_or_else(|m| (*m).clone());
                return Err(e.into());
            }
        };
        log::info!(
            "match started: {} regions, {} combat, seed {:?}",
            game.map().region_count(),
            game.config.combat,
            game.config.seed
        );
        writeln!(out, "{}", format_pickable(game.pickable()))?;
        self.game = Some(game);
        self.prompt(out)
    }

    /// Handles a bot's answer for the current phase.
    pub fn handle_submit<W: Write>(
        &mut self,
        player: &str,
        text: &str,
        out: &mut W,
    ) -> Result<(), RefereeError> {
        let game = self.game.as_mut().ok_or(RefereeError::NoMatch)?;
        let expected = game.active_player().id.clone();
        if game.phase() != Phase::GameOver && player != expected {
            return Err(RefereeError::NotYourTurn {
                player: player.to_string(),
                expected,
            });
        }

        match game.phase() {
            Phase::Setup => {
                let choice = parse_starting_region(game.map(), text, player)?;
                game.choose_region(choice.region)?;
            }
            Phase::PlaceArmies => {
                let (places, attacks) = split_parsed(game, player, text, out)?;
                if !attacks.is_empty() {
                    log::warn!("{} sent attack/transfer moves while placing", player);
                }
                let report = place_armies(game, places)?;
                write_report(out, player, &report)?;
            }
            Phase::AttackTransfer => {
                let (places, attacks) = split_parsed(game, player, text, out)?;
                if !places.is_empty() {
                    log::warn!("{} sent place_armies moves while attacking", player);
                }
                let report = attack_transfer(game, attacks)?;
                write_report(out, player, &report)?;
            }
            Phase::GameOver => {
                return Err(GameError::WrongPhase {
                    action: "submit",
                    phase: Phase::GameOver,
                }
                .into())
            }
        }
        self.prompt(out)
    }

    /// Writes the `update_map` line `seat` would receive.
    pub fn handle_view<W: Write>(&self, seat: Seat, out: &mut W) -> Result<(), RefereeError> {
        let game = self.game.as_ref().ok_or(RefereeError::NoMatch)?;
        writeln!(out, "{}", format_map_update(game, seat))?;
        out.flush()?;
        Ok(())
    }

    /// Writes `status round <n> turn <player> phase <phase>`.
    pub fn handle_status<W: Write>(&self, out: &mut W) -> Result<(), RefereeError> {
        let game = self.game.as_ref().ok_or(RefereeError::NoMatch)?;
        writeln!(
            out,
            "status round {} turn {} phase {}",
            game.round(),
            game.active_player().id,
            game.phase().name()
        )?;
        out.flush()?;
        Ok(())
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Tells the host whose answer is expected next, or how the match ended.
    fn prompt<W: Write>(&self, out: &mut W) -> Result<(), RefereeError> {
        let game = self.game.as_ref().ok_or(RefereeError::NoMatch)?;
        let player = &game.active_player().id;
        match game.phase() {
            Phase::Setup => writeln!(out, "go pick_starting_region {}", player)?,
            Phase::PlaceArmies => writeln!(out, "go place_armies {}", player)?,
            Phase::AttackTransfer => writeln!(out, "go attack/transfer {}", player)?,
            Phase::GameOver => match game.winning_player() {
                Some(seat) => writeln!(out, "game_over {}", game.player(seat).id)?,
                None => writeln!(out, "game_over draw")?,
            },
        }
        out.flush()?;
        Ok(())
    }
}

fn split_parsed<W: Write>(
    game: &GameState,
    player: &str,
    text: &str,
    out: &mut W,
) -> Result<(Vec<PlaceArmies>, Vec<AttackTransfer>), RefereeError> {
    let parsed = parse_moves(game.map(), text, player);
    for e in &parsed.errors {
        writeln!(out, "illegal {} {}", player, e)?;
    }
    Ok(split_moves(parsed.moves))
}

fn write_report<W: Write, M: Clone + Into<Move>>(
    out: &mut W,
    player: &str,
    report: &PhaseReport<M>,
) -> io::Result<()> {
    for (mv, reason) in report.rejected() {
        let mv: Move = mv.clone().into();
        writeln!(out, "illegal {} {}: {}", player, format_move(&mv), reason)?;
    }
    writeln!(out, "{}", format_opponent_moves(&report.observed))
}
