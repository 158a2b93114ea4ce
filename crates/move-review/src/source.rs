//! Game loading from PGN files

use std::path::Path;

use chess_core::pgn::read_game;
use chess_core::Game;
use tracing::info;

use crate::error::ReviewError;

/// Load game number `index` (1-based) from a PGN file.
pub async fn load_game(path: &Path, index: usize) -> Result<Game, ReviewError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ReviewError::Source(format!("Failed to read {}: {e}", path.display())))?;

    let game = game_from_text(&text, index)?;
    info!(
        path = %path.display(),
        index,
        white = %game.metadata.white,
        black = %game.metadata.black,
        plies = game.len(),
        "Game loaded"
    );
    Ok(game)
}

/// Pick game number `index` (1-based) out of PGN text and validate it.
pub fn game_from_text(text: &str, index: usize) -> Result<Game, ReviewError> {
    if index == 0 {
        return Err(ReviewError::Input("game index starts at 1".into()));
    }

    let data = read_game(text, index)?
        .ok_or_else(|| ReviewError::Source(format!("Game {index} not found in PGN text")))?;

    Ok(Game::from_game_data(data)?)
}
