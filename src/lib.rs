//! # Connect Four Engine
//!
//! A wagered, two-player Connect Four game for chat bots. A creator opens a
//! game with an optional bet, a second participant joins, and the two take
//! turns against a per-turn timer until someone connects four, the board
//! fills, or a player runs out of time. Stakes are escrowed and settled
//! through a host-supplied [`ledger::Ledger`].
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: board, seats, phase machine, win detection
//! - [`engine`] — Join protocol, turn timers, settlement and events
//! - [`ledger`] — Currency ledger trait and an in-memory implementation
//! - [`render`] — Text and emoji board rendering
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod ledger;
pub mod render;
