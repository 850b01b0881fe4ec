//! Integration tests for the conquest referee binary.
//!
//! Tests the full session flow by spawning the referee process, sending
//! commands via stdin, and verifying stdout responses.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};
use std::sync::Arc;

use conquest::board::{GameState, RegionId};
use conquest::config::GameConfig;
use conquest::protocol::setup::parse_setup;

/// Sends a sequence of commands to the referee and collects stdout lines.
fn run_referee(commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_conquest");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start conquest");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

const MAP: [&str; 3] = [
    "setup_map continents 1 2 2 3",
    "setup_map regions 1 1 2 1 3 2 4 2",
    "setup_map neighbors 1 2,3 2 3 3 4",
];

const SEED: u64 = 11;

/// The pool the referee will draw for `MAP` with `SEED`.
fn expected_pool() -> Vec<RegionId> {
    let map = Arc::new(parse_setup(&MAP.join("\n")).unwrap());
    let config = GameConfig {
        seed: Some(SEED),
        starting_regions_per_player: 2,
        ..GameConfig::default()
    };
    GameState::new(config, map).unwrap().pickable().to_vec()
}

/// Commands that set up the map and run the whole pick sequence.
fn through_setup() -> Vec<String> {
    let mut commands: Vec<String> = MAP.iter().map(|s| s.to_string()).collect();
    commands.push(format!("settings seed {}", SEED));
    commands.push("settings starting_regions_per_player 2".to_string());
    commands.push("start".to_string());
    for (i, region) in expected_pool().iter().enumerate() {
        commands.push(format!("submit player{} {}", i % 2 + 1, region));
    }
    commands
}

#[test]
fn isready_response() {
    let lines = run_referee(&["isready", "quit"]);
    assert_eq!(lines, vec!["readyok"]);
}

#[test]
fn unknown_commands_are_ignored() {
    let lines = run_referee(&["foobar", "go place_armies", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok"]);
}

#[test]
fn empty_lines_are_ignored() {
    let lines = run_referee(&["", "   ", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok"]);
}

#[test]
fn eof_exits_cleanly() {
    let lines = run_referee(&["isready"]);
    assert_eq!(lines, vec!["readyok"]);
}

#[test]
fn submit_before_start_is_an_error() {
    let lines = run_referee(&["submit player1 3", "status", "quit"]);
    assert_eq!(
        lines,
        vec!["error no match in progress", "error no match in progress"]
    );
}

#[test]
fn bad_setup_reference_is_reported() {
    let lines = run_referee(&["setup_map continents 1 2", "setup_map regions 1 4", "quit"]);
    assert_eq!(lines, vec!["error continent 4 not found"]);
}

#[test]
fn pool_matches_the_library_for_the_same_seed() {
    let commands = through_setup();
    let mut commands: Vec<&str> = commands.iter().map(String::as_str).collect();
    commands.push("quit");
    let lines = run_referee(&commands);

    let pool: Vec<String> = expected_pool().iter().map(|r| r.to_string()).collect();
    assert_eq!(lines[0], format!("pickable_starting_regions {}", pool.join(" ")));
    assert_eq!(lines[1], "go pick_starting_region player1");
    assert_eq!(lines[2], "go pick_starting_region player2");
    assert_eq!(lines[3], "go pick_starting_region player1");
    assert_eq!(lines[4], "go pick_starting_region player2");
    assert_eq!(lines[5], "go place_armies player1");
}

#[test]
fn full_round_session() {
    let commands = through_setup();
    let mut commands: Vec<&str> = commands.iter().map(String::as_str).collect();
    commands.extend([
        "submit player1",
        "submit player1",
        "status",
        "submit player2",
        "submit player2",
        "status",
        "view 1",
        "quit",
    ]);
    let lines = run_referee(&commands);
    let after_setup = &lines[6..];

    assert_eq!(
        after_setup[..5],
        [
            "opponent_moves",
            "go attack/transfer player1",
            "opponent_moves",
            "go place_armies player2",
            "status round 1 turn player2 phase place_armies",
        ]
    );
    assert_eq!(after_setup[9], "status round 2 turn player1 phase place_armies");
    assert!(after_setup[10].starts_with("update_map "));
    let triplets = after_setup[10].split_whitespace().count() - 1;
    assert_eq!(triplets % 3, 0);
}

#[test]
fn out_of_turn_pick_is_rejected_without_advancing() {
    let pool = expected_pool();
    let mut commands: Vec<String> = MAP.iter().map(|s| s.to_string()).collect();
    commands.push(format!("settings seed {}", SEED));
    commands.push("settings starting_regions_per_player 2".to_string());
    commands.push("start".to_string());
    commands.push(format!("submit player2 {}", pool[0]));
    commands.push("submit player1 99".to_string());
    commands.push("status".to_string());
    let commands: Vec<&str> = commands.iter().map(String::as_str).collect();
    let lines = run_referee(&commands);

    assert_eq!(
        lines[2..],
        [
            "error player2 cannot move now, waiting for player1",
            "error unknown region 99",
            "status round 1 turn player1 phase setup",
        ]
    );
}

#[test]
fn settings_after_start_are_refused() {
    let mut commands: Vec<&str> = MAP.to_vec();
    commands.extend(["start", "settings combat continual", "quit"]);
    let lines = run_referee(&commands);
    assert_eq!(lines.last().unwrap(), "error match already started");
}

#[test]
fn unknown_combat_mode_is_reported() {
    let lines = run_referee(&["settings combat dice", "quit"]);
    assert_eq!(lines, vec!["error unknown combat mode 'dice'"]);
}

#[test]
fn newgame_resets_state() {
    let mut commands: Vec<&str> = MAP.to_vec();
    commands.extend(["start", "newgame", "status", "quit"]);
    let lines = run_referee(&commands);
    assert_eq!(lines.last().unwrap(), "error no match in progress");
}

#[test]
fn inactive_player_cannot_skip_the_placement() {
    let commands = through_setup();
    let mut commands: Vec<&str> = commands.iter().map(String::as_str).collect();
    commands.extend(["submit player2", "submit player2 place_armies 1 5", "status", "quit"]);
    let lines = run_referee(&commands);

    assert_eq!(
        lines[6..],
        [
            "error player2 cannot move now, waiting for player1",
            "error player2 cannot move now, waiting for player1",
            "status round 1 turn player1 phase place_armies",
        ]
    );
}
