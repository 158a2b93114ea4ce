//! Game source error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Failed to read PGN: {0}")]
    Read(String),

    #[error("No game found in PGN text")]
    NoGame,

    #[error("Game starts from a non-standard position: {0}")]
    NonStandardStart(String),

    #[error("Invalid SAN '{san}' at ply {ply}: {reason}")]
    InvalidSan {
        ply: usize,
        san: String,
        reason: String,
    },

    #[error("Illegal move '{san}' at ply {ply}: {reason}")]
    IllegalMove {
        ply: usize,
        san: String,
        reason: String,
    },

    #[error("Invalid UCI move '{uci}': {reason}")]
    InvalidUci { uci: String, reason: String },
}
