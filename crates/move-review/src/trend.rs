//! Ply-by-ply evaluation trend over the whole game.
//!
//! Every ply (both sides) is sampled once with the stability sampler after the
//! move is played. The report table reuses these same values.

use chess_core::Game;
use serde::Serialize;
use shakmaty::Color;
use tracing::{debug, info};

use crate::config::ReviewSettings;
use crate::engine::AnalysisPort;
use crate::error::ReviewError;
use crate::sampler::stable_evaluation;

/// Linear region of the compressive chart scale, in centipawns.
pub const SYMLOG_LINEAR_THRESHOLD: f64 = 50.0;

/// Averaged evaluation of the position after one ply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlyEvaluation {
    pub ply: usize,
    #[serde(serialize_with = "crate::engine::color_serde::serialize")]
    pub side: Color,
    pub notation: String,
    pub eval: f64,
}

/// One point of the trend series handed to a chart renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub ply: usize,
    pub eval: f64,
    /// `eval` on the symmetric-log scale
    pub scaled: f64,
}

impl From<&PlyEvaluation> for TrendPoint {
    fn from(e: &PlyEvaluation) -> Self {
        Self {
            ply: e.ply,
            eval: e.eval,
            scaled: symlog(e.eval, SYMLOG_LINEAR_THRESHOLD),
        }
    }
}

/// Symmetric log: linear within `±linthresh`, logarithmic beyond, continuous
/// at the boundary. Keeps both small and mate-sized swings legible.
pub fn symlog(value: f64, linthresh: f64) -> f64 {
    let magnitude = value.abs();
    if magnitude <= linthresh {
        value / linthresh
    } else {
        value.signum() * (1.0 + (magnitude / linthresh).log10())
    }
}

/// Sample the position after every ply of the game.
pub async fn evaluate_plies<E: AnalysisPort>(
    engine: &mut E,
    game: &Game,
    settings: &ReviewSettings,
) -> Result<Vec<PlyEvaluation>, ReviewError> {
    let mut replay = game.replay();
    let mut evaluations = Vec::with_capacity(game.len());

    for ply in game.plies() {
        let notation = ply.notation.clone();
        replay.advance(ply);

        let eval =
            stable_evaluation(engine, replay.position(), settings.tracked, &settings.sampling)
                .await?;
        debug!(ply = ply.index, notation = %notation, eval, "Ply evaluated");

        evaluations.push(PlyEvaluation {
            ply: ply.index,
            side: ply.side_to_move,
            notation,
            eval,
        });
    }

    info!(plies = evaluations.len(), "Trend series built");
    Ok(evaluations)
}

pub fn trend_series(evaluations: &[PlyEvaluation]) -> Vec<TrendPoint> {
    evaluations.iter().map(TrendPoint::from).collect()
}
