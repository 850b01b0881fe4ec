//! Self-play match generation CLI.
//!
//! Plays random-bot matches and writes one JSON record per match.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N        Number of matches to play (default: 10)
//!   --threads N      Number of parallel threads (default: 4)
//!   --seed N         Base seed (default: entropy)
//!   --max-rounds N   Round limit per match (default: 100)
//!   --combat MODE    batch or continual (default: batch)
//!   --config FILE    JSON match config, applied before the flags above
//!   --map FILE       Map in setup notation (default: built-in demo map)
//!   --output FILE    Output file path (default: stdout)
//!   --quiet          Suppress summary output

use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use conquest::config::GameConfig;
use conquest::protocol::setup::parse_setup;
use conquest::selfplay::{self, SelfPlayConfig, DEMO_MAP};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut config_path: Option<String> = None;
    let mut map_path: Option<String> = None;
    let mut output_path: Option<String> = None;
    let mut max_rounds: Option<u32> = None;
    let mut combat: Option<String> = None;
    let mut quiet = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                config.num_games = value(&args, i, "--games");
            }
            "--threads" => {
                i += 1;
                config.threads = value(&args, i, "--threads");
            }
            "--seed" => {
                i += 1;
                config.seed = Some(value(&args, i, "--seed"));
            }
            "--max-rounds" => {
                i += 1;
                max_rounds = Some(value(&args, i, "--max-rounds"));
            }
            "--combat" => {
                i += 1;
                combat = Some(value(&args, i, "--combat"));
            }
            "--config" => {
                i += 1;
                config_path = Some(value(&args, i, "--config"));
            }
            "--map" => {
                i += 1;
                map_path = Some(value(&args, i, "--map"));
            }
            "--output" => {
                i += 1;
                output_path = Some(value(&args, i, "--output"));
            }
            "--quiet" => {
                quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    if let Some(path) = config_path {
        config.game = fail_on_err(
            read(&path).and_then(|s| GameConfig::from_json(&s).map_err(|e| e.to_string())),
        );
    }
    if let Some(n) = max_rounds {
        config.game.max_rounds = n;
    }
    if let Some(mode) = combat {
        fail_on_err(config.game.set_combat_mode(&mode).map_err(|e| e.to_string()));
    }
    fail_on_err(config.game.validate().map_err(|e| e.to_string()));

    let map_text = match map_path {
        Some(path) => fail_on_err(read(&path)),
        None => DEMO_MAP.to_string(),
    };
    let map = Arc::new(fail_on_err(parse_setup(&map_text).map_err(|e| e.to_string())));

    if !quiet {
        eprintln!(
            "Self-play: {} matches, {} regions, {} combat, max {} rounds, {} threads",
            config.num_games,
            map.region_count(),
            config.game.combat,
            config.game.max_rounds,
            config.threads
        );
    }

    let start = Instant::now();
    let records = fail_on_err(selfplay::run_self_play(map, &config).map_err(|e| e.to_string()));
    if !quiet {
        selfplay::print_summary(&records, start);
    }

    let written = match &output_path {
        Some(path) => File::create(path)
            .and_then(|f| selfplay::write_jsonl(&records, &mut BufWriter::new(f))),
        None => {
            let stdout = io::stdout();
            selfplay::write_jsonl(&records, &mut BufWriter::new(stdout.lock()))
        }
    };
    fail_on_err(written.map_err(|e| format!("failed to write output: {}", e)));
    if let (Some(path), false) = (output_path, quiet) {
        eprintln!("Wrote {} matches to {}", records.len(), path);
    }
}

/// Parses the value following a flag, exiting with usage on failure.
fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|s| s.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn read(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e))
}

fn fail_on_err<T>(result: Result<T, String>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of matches to play (default: 10)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Base seed (default: entropy)");
    eprintln!("  --max-rounds N   Round limit per match (default: 100)");
    eprintln!("  --combat MODE    batch or continual (default: batch)");
    eprintln!("  --config FILE    JSON match config");
    eprintln!("  --map FILE       Map in setup notation (default: built-in demo map)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress summary output");
    eprintln!("  --help           Show this help");
}
