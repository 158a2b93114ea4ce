//! Repeated-query sampling that smooths out search nondeterminism.

use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Color};
use tracing::debug;

use crate::engine::{top_line, AnalysisPort, SearchBudget};
use crate::error::ReviewError;
use crate::normalize::normalize;

/// How many times each position is queried, and with what budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sampling {
    pub trials: u32,
    pub budget: SearchBudget,
}

/// Arithmetic mean of normalized samples. Empty input yields `0.0`.
pub fn mean(samples: &[i32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: i64 = samples.iter().map(|&s| i64::from(s)).sum();
    sum as f64 / samples.len() as f64
}

/// Query `position` `sampling.trials` times and average the normalized scores.
///
/// Each trial analyzes its own clone of the position.
pub async fn stable_evaluation<E: AnalysisPort>(
    engine: &mut E,
    position: &Chess,
    tracked: Color,
    sampling: &Sampling,
) -> Result<f64, ReviewError> {
    let mut samples = Vec::with_capacity(sampling.trials as usize);

    for trial in 1..=sampling.trials {
        let probe = position.clone();
        let line = top_line(engine.analyze(&probe, sampling.budget, 1).await?)?;
        let eval = normalize(line.score, tracked);
        debug!(trial, eval, "Sampled position");
        samples.push(eval);
    }

    Ok(mean(&samples))
}
