//! Self-play match generation.
//!
//! Plays full matches between two random bots that only see the text
//! protocol: the map arrives as setup lines, the board as `update_map`
//! lines, and their answers are parsed exactly like a remote bot's. Used for
//! soak testing the rules engine and for benchmarks.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;

use crate::board::map::{MapGraph, RegionId};
use crate::board::moves::{split_moves, AttackTransfer, Move, PlaceArmies};
use crate::board::player::Seat;
use crate::board::state::{GameError, GameState, Phase};
use crate::config::{ConfigError, GameConfig};
use crate::protocol::moves::{
    format_moves, format_opponent_moves, parse_moves, parse_starting_region, ParseError,
};
use crate::protocol::setup::{format_map_update, format_pickable, format_setup, SetupError};
use crate::resolve::{attack_transfer, place_armies};
use crate::view::BotView;

/// A small four-continent map in setup notation.
pub const DEMO_MAP: &str = "\
setup_map continents 1 2 2 3 3 2 4 4
setup_map regions 1 1 2 1 3 1 4 1 5 2 6 2 7 2 8 2 9 3 10 3 11 3 12 4 13 4 14 4
setup_map neighbors 1 2,3 2 3,4 3 4,9 4 5 5 6,7 6 7,8 7 8 8 12 9 10,11 10 11,13 11 12 12 13,14 13 14
";

/// Chance that a random bot attacks from a region that can.
const ATTACK_CHANCE: f64 = 0.7;

#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("bot pick rejected: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration for a batch of self-play matches.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of matches to play.
    pub num_games: usize,
    /// Number of parallel threads.
    pub threads: usize,
    /// Base seed; match `i` uses `seed + i`. `None` draws from entropy.
    pub seed: Option<u64>,
    /// Rules for every match. Its own `seed` is ignored.
    pub game: GameConfig,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            threads: 4,
            seed: None,
            game: GameConfig::default(),
        }
    }
}

/// Outcome of one self-play match, written as one JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub match_id: usize,
    pub seed: u64,
    /// Seat number of the winner, `None` when the round limit was hit.
    pub winner: Option<u8>,
    pub rounds: u32,
    /// Regions held by seats one and two at the end.
    pub regions: [usize; 2],
    /// Moves the rules engine rejected.
    pub illegal_moves: usize,
    pub battles: usize,
}

/// A bot that plays legal-looking random moves from its own view.
pub struct RandomBot {
    view: BotView,
    rng: SmallRng,
}

impl RandomBot {
    pub fn new(seat: Seat, seed: u64) -> Self {
        let mut view = BotView::new();
        view.set_me(seat);
        RandomBot {
            view,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Feeds one line of the referee's stream to the bot.
    pub fn feed(&mut self, line: &str) -> Result<(), SetupError> {
        self.view.handle_line(line)
    }

    pub fn view(&self) -> &BotView {
        &self.view
    }

    /// Answers a starting-region request with a bare region id.
    pub fn pick_starting_region(&mut self) -> String {
        self.view
            .pickable()
            .choose(&mut self.rng)
            .map(|r| r.to_string())
            .unwrap_or_default()
    }

    /// Spreads the announced allotment over border regions, one army at a
    /// time.
    pub fn place_armies(&mut self) -> String {
        let Some(me) = self.view.me() else {
            return String::new();
        };
        let mine = self.view.my_regions();
        let border: Vec<RegionId> = mine
            .iter()
            .copied()
            .filter(|r| !self.view.foreign_neighbors(*r).is_empty())
            .collect();
        let targets = if border.is_empty() { &mine } else { &border };
        if targets.is_empty() {
            return String::new();
        }

        let mut placed: Vec<(RegionId, i32)> = Vec::new();
        for _ in 0..self.view.starting_armies() {
            let Some(region) = targets.choose(&mut self.rng).copied() else {
                break;
            };
            match placed.iter_mut().find(|(r, _)| *r == region) {
                Some((_, n)) => *n += 1,
                None => placed.push((region, 1)),
            }
        }

        let player = format!("player{}", me);
        let moves: Vec<Move> = placed
            .into_iter()
            .map(|(region, armies)| {
                PlaceArmies {
                    player: player.clone(),
                    region,
                    armies,
                }
                .into()
            })
            .collect();
        format_moves(&moves)
    }

    /// Attacks weaker neighbors and pushes armies out of interior regions.
    pub fn attack_transfer(&mut self) -> String {
        let Some(me) = self.view.me() else {
            return String::new();
        };
        let player = format!("player{}", me);
        let mut moves: Vec<Move> = Vec::new();

        for from in self.view.my_regions() {
            let available = self.view.region(from).armies.saturating_sub(1);
            if available == 0 {
                continue;
            }
            let foreign = self.view.foreign_neighbors(from);
            let to = if foreign.is_empty() {
                self.view
                    .map()
                    .region(from)
                    .ok()
                    .map(|r| r.neighbors().collect::<Vec<_>>())
                    .and_then(|own| own.choose(&mut self.rng).copied())
            } else if self.rng.gen_bool(ATTACK_CHANCE) {
                foreign
                    .choose(&mut self.rng)
                    .copied()
                    .filter(|t| self.view.region(*t).armies < available)
            } else {
                None
            };
            if let Some(to) = to {
                moves.push(
                    AttackTransfer {
                        player: player.clone(),
                        from,
                        to,
                        armies: available as i32,
                    }
                    .into(),
                );
            }
        }
        format_moves(&moves)
    }
}

/// Plays one match on `map` with the given seed.
pub fn play_match(
    map: Arc<MapGraph>,
    config: &GameConfig,
    match_id: usize,
    seed: u64,
) -> Result<MatchRecord, SelfPlayError> {
    let config = GameConfig {
        seed: Some(seed),
        ..config.clone()
    };
    let mut game = GameState::new(config, Arc::clone(&map))?;
    let mut bots = [
        RandomBot::new(Seat::One, seed.wrapping_mul(2)),
        RandomBot::new(Seat::Two, seed.wrapping_mul(2).wrapping_add(1)),
    ];
    for (bot, seat) in bots.iter_mut().zip([Seat::One, Seat::Two]) {
        for line in format_setup(&map) {
            bot.feed(&line)?;
        }
        bot.feed(&format!("settings your_player_number {}", seat))?;
    }

    while game.phase() == Phase::Setup {
        let seat = game.turn();
        let bot = &mut bots[seat.index()];
        bot.feed(&format_pickable(game.pickable()))?;
        let answer = bot.pick_starting_region();
        let choice = parse_starting_region(game.map(), &answer, &game.player(seat).id)?;
        game.choose_region(choice.region)?;
    }

    let mut record = MatchRecord {
        match_id,
        seed,
        winner: None,
        rounds: 0,
        regions: [0, 0],
        illegal_moves: 0,
        battles: 0,
    };

    while game.phase() != Phase::GameOver {
        let seat = game.turn();
        let id = game.player(seat).id.clone();
        let (me, them) = match seat {
            Seat::One => {
                let (a, b) = bots.split_at_mut(1);
                (&mut a[0], &mut b[0])
            }
            Seat::Two => {
                let (a, b) = bots.split_at_mut(1);
                (&mut b[0], &mut a[0])
            }
        };

        let allotment = game.player(seat).armies_per_turn;
        me.feed(&format!("settings starting_armies {}", allotment))?;
        me.feed(&format_map_update(&game, seat))?;
        let parsed = parse_moves(game.map(), &me.place_armies(), &id);
        record.illegal_moves += parsed.errors.len();
        let (places, _) = split_moves(parsed.moves);
        let report = place_armies(&mut game, places)?;
        record.illegal_moves += report.rejected().count();
        them.feed(&format_opponent_moves(&report.observed))?;

        me.feed(&format_map_update(&game, seat))?;
        let parsed = parse_moves(game.map(), &me.attack_transfer(), &id);
        record.illegal_moves += parsed.errors.len();
        let (_, attacks) = split_moves(parsed.moves);
        let report = attack_transfer(&mut game, attacks)?;
        record.illegal_moves += report.rejected().count();
        record.battles += report.battles.len();
        them.feed(&format_opponent_moves(&report.observed))?;
    }

    record.winner = game.winning_player().map(Seat::number);
    record.rounds = game.round().min(game.config.max_rounds);
    record.regions = [
        game.owned_regions(Seat::One).count(),
        game.owned_regions(Seat::Two).count(),
    ];
    log::info!(
        "match {} (seed {}): {} after {} rounds",
        match_id,
        seed,
        match record.winner {
            Some(w) => format!("player{} wins", w),
            None => "draw".to_string(),
        },
        record.rounds
    );
    Ok(record)
}

/// Plays `config.num_games` matches on `map`, in parallel when
/// `config.threads > 1`. Records come back in match order.
pub fn run_self_play(
    map: Arc<MapGraph>,
    config: &SelfPlayConfig,
) -> Result<Vec<MatchRecord>, SelfPlayError> {
    let base = config.seed.unwrap_or_else(rand::random);
    let seed_for = |i: usize| base.wrapping_add(i as u64);

    if config.threads <= 1 {
        return (0..config.num_games)
            .map(|i| play_match(Arc::clone(&map), &config.game, i, seed_for(i)))
            .collect();
    }

    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    pool.install(|| {
        (0..config.num_games)
            .into_par_iter()
            .map(|i| play_match(Arc::clone(&map), &config.game, i, seed_for(i)))
            .collect()
    })
}

/// Writes match records as JSONL (one JSON object per line).
pub fn write_jsonl<W: Write>(records: &[MatchRecord], out: &mut W) -> std::io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Prints a summary of self-play results to stderr.
pub fn print_summary(records: &[MatchRecord], started: Instant) {
    let total = records.len().max(1) as f64;
    let wins = |seat: u8| records.iter().filter(|r| r.winner == Some(seat)).count();
    let draws = records.iter().filter(|r| r.winner.is_none()).count();
    let rounds: u32 = records.iter().map(|r| r.rounds).sum();
    let battles: usize = records.iter().map(|r| r.battles).sum();
    let illegal: usize = records.iter().map(|r| r.illegal_moves).sum();

    eprintln!("=== Self-Play Summary ===");
    eprintln!(
        "Matches: {} in {:.1}s",
        records.len(),
        started.elapsed().as_secs_f64()
    );
    eprintln!("Player 1 wins: {}", wins(1));
    eprintln!("Player 2 wins: {}", wins(2));
    eprintln!("Draws: {}", draws);
    eprintln!("Avg rounds/match: {:.1}", rounds as f64 / total);
    eprintln!("Avg battles/match: {:.1}", battles as f64 / total);
    eprintln!("Illegal moves: {}", illegal);
}
