//! Per-move error analysis for the tracked side.
//!
//! For each tracked move the engine is asked, `trials` times, for its best
//! line and for the position after the move actually played. The absolute gap
//! between the two normalized evaluations is averaged into the move's error.

use chess_core::game::{notation, play_on_copy, uci_to_move};
use chess_core::Game;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ReviewSettings;
use crate::engine::{top_line, AnalysisPort};
use crate::error::ReviewError;
use crate::normalize::normalize;
use crate::sampler::mean;

/// Judgment of a single move played by the tracked side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveRecord {
    /// 1-based count of tracked-side moves
    pub move_index: usize,
    /// 1-based half-move index in the game
    pub ply: usize,
    pub played: String,
    /// Engine recommendation from the first trial
    pub best: String,
    /// Per-trial `|best - played|`
    pub errors: Vec<i32>,
    pub avg_error: f64,
    pub accurate: bool,
    pub flagged: bool,
}

impl MoveRecord {
    pub fn new(
        move_index: usize,
        ply: usize,
        played: String,
        best: String,
        errors: Vec<i32>,
        threshold: u32,
    ) -> Self {
        let avg_error = mean(&errors);
        let accurate = is_accurate(avg_error, threshold);
        let flagged = played != best && !accurate;

        Self {
            move_index,
            ply,
            played,
            best,
            errors,
            avg_error,
            accurate,
            flagged,
        }
    }
}

/// Accurate means strictly below the threshold.
pub fn is_accurate(avg_error: f64, threshold: u32) -> bool {
    avg_error < f64::from(threshold)
}

/// Walk the game and judge every move made by `settings.tracked`.
///
/// Opponent moves are replayed without querying the engine.
pub async fn analyze_move_errors<E: AnalysisPort>(
    engine: &mut E,
    game: &Game,
    settings: &ReviewSettings,
) -> Result<Vec<MoveRecord>, ReviewError> {
    let mut replay = game.replay();
    let mut records = Vec::new();

    for ply in game.plies() {
        if ply.side_to_move != settings.tracked {
            replay.advance(ply);
            continue;
        }

        let played = ply.notation.clone();
        let mut best: Option<String> = None;
        let mut errors = Vec::with_capacity(settings.sampling.trials as usize);

        for trial in 1..=settings.sampling.trials {
            let branch = replay.snapshot();

            let best_line = top_line(engine.analyze(&branch, settings.sampling.budget, 1).await?)?;
            let best_eval = normalize(best_line.score, settings.tracked);
            if best.is_none() {
                let uci = best_line.first_move().ok_or_else(|| {
                    ReviewError::Stockfish(format!("No best move reported at ply {}", ply.index))
                })?;
                let best_move = uci_to_move(&branch, uci).map_err(|e| {
                    ReviewError::Stockfish(format!("Unusable best move at ply {}: {e}", ply.index))
                })?;
                best = Some(notation(&branch, &best_move));
            }

            let after_played = play_on_copy(&branch, &ply.mv);
            let played_line =
                top_line(engine.analyze(&after_played, settings.sampling.budget, 1).await?)?;
            let played_eval = normalize(played_line.score, settings.tracked);

            let error = (best_eval - played_eval).abs();
            debug!(ply = ply.index, trial, best_eval, played_eval, error, "Move trial");
            errors.push(error);
        }

        let record = MoveRecord::new(
            records.len() + 1,
            ply.index,
            played,
            best.unwrap_or_default(),
            errors,
            settings.threshold,
        );
        info!(
            ply = record.ply,
            played = %record.played,
            best = %record.best,
            avg_error = record.avg_error,
            accurate = record.accurate,
            "Move judged"
        );
        records.push(record);

        replay.advance(ply);
    }

    Ok(records)
}
