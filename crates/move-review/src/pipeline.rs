//! End-to-end review of one game.

use chess_core::Game;
use serde::Serialize;
use tracing::info;

use crate::accuracy::AccuracySummary;
use crate::config::{EngineConfig, ReviewSettings};
use crate::engine::AnalysisPort;
use crate::error::ReviewError;
use crate::move_errors::{analyze_move_errors, MoveRecord};
use crate::report::GameReport;
use crate::stockfish::StockfishEngine;
use crate::trend::evaluate_plies;

/// Everything one run produces
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub settings: ReviewSettings,
    pub report: GameReport,
    pub moves: Vec<MoveRecord>,
    pub accuracy: AccuracySummary,
}

/// Run the trend pass, then the move error pass, strictly one query at a time.
pub async fn review_game<E: AnalysisPort>(
    engine: &mut E,
    game: &Game,
    settings: &ReviewSettings,
) -> Result<Review, ReviewError> {
    info!(
        plies = game.len(),
        trials = settings.sampling.trials,
        budget = %settings.sampling.budget,
        threshold = settings.threshold,
        "Starting review"
    );

    let evaluations = evaluate_plies(engine, game, settings).await?;
    let report = GameReport::from_evaluations(game.metadata.clone(), &evaluations);

    let moves = analyze_move_errors(engine, game, settings).await?;
    let accuracy = AccuracySummary::from_records(&moves);

    info!(
        total = accuracy.total,
        accurate = accuracy.accurate,
        flagged = accuracy.flagged.len(),
        percentage = accuracy.percentage,
        "Review complete"
    );

    Ok(Review {
        settings: *settings,
        report,
        moves,
        accuracy,
    })
}

/// Start a Stockfish session, review the game and stop the engine on every path.
pub async fn run_review(
    engine_config: &EngineConfig,
    game: &Game,
    settings: &ReviewSettings,
) -> Result<Review, ReviewError> {
    let mut engine = StockfishEngine::new(engine_config).await?;
    let result = review_game(&mut engine, game, settings).await;
    engine.quit().await;
    result
}
