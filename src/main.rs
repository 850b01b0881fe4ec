//! Conquest referee.
//!
//! This binary reads host commands from stdin and writes protocol lines to
//! stdout. Diagnostics go to stderr through `env_logger` (set `RUST_LOG`).

use std::io::{self, BufRead, Write};

use conquest::engine::{Referee, RefereeError};
use conquest::protocol::parser::{parse_command, Command};

/// Runs the referee loop until `quit` or end of input.
fn main() {
    env_logger::init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut referee = Referee::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        let result = match cmd {
            Command::IsReady => referee.handle_isready(&mut out).map_err(RefereeError::from),
            Command::NewGame => {
                referee.new_game();
                Ok(())
            }
            Command::SetupMap { line } => referee.setup_map(&line),
            Command::Settings { key, value } => referee.set_setting(&key, &value),
            Command::Start => referee.handle_start(&mut out),
            Command::Submit { player, text } => referee.handle_submit(&player, &text, &mut out),
            Command::View { seat } => referee.handle_view(seat, &mut out),
            Command::Status => referee.handle_status(&mut out),
            Command::Quit => break,
        };

        match result {
            Ok(()) => {}
            Err(RefereeError::Io(e)) => {
                log::error!("stdout closed: {}", e);
                break;
            }
            Err(e) => {
                log::warn!("{}", e);
                if writeln!(out, "error {}", e).and_then(|_| out.flush()).is_err() {
                    break;
                }
            }
        }
    }
}
