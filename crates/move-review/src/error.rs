//! Review error types

use chess_core::GameError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Game source error: {0}")]
    Source(String),

    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Stockfish error: {0}")]
    Stockfish(String),
}

impl ReviewError {
    /// Pipeline stage the failure belongs to, for user-facing reports.
    pub fn stage(&self) -> &'static str {
        match self {
            ReviewError::Config(_) | ReviewError::Input(_) => "configuration",
            ReviewError::Source(_) | ReviewError::Game(_) => "game source",
            ReviewError::Stockfish(_) => "engine",
        }
    }
}
