//! Conquest rules engine library.
//!
//! Exposes the region graph and game state, the rules engine and combat
//! resolver, the text protocols, and the self-play harness for use by
//! integration tests and the binary entry points.

pub mod board;
pub mod config;
pub mod engine;
pub mod protocol;
pub mod resolve;
pub mod selfplay;
pub mod view;
