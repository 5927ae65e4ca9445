use std::path::PathBuf;

use crate::ledger::LedgerError;

/// Reasons a participant cannot take the free seat.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    #[error("the game is no longer accepting players")]
    NotJoinable,

    #[error("the creator cannot join their own game")]
    SelfJoin,

    #[error("bet {offered} does not match the game's bet of {required}")]
    BetMismatch { offered: u64, required: u64 },

    #[error("the game has been disposed")]
    Disposed,

    #[error("ledger refused the stake: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors that can occur when opening a game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreateError {
    #[error("invalid game rules: {0}")]
    InvalidRules(String),

    #[error("could not escrow the creator's stake: {0}")]
    Escrow(#[from] LedgerError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
