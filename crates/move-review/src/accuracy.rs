/// Accuracy aggregation: pure functions only

use serde::Serialize;

use crate::move_errors::MoveRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccuracySummary {
    pub total: usize,
    pub accurate: usize,
    pub percentage: f64,
    /// Inaccurate moves that differ from the engine's choice, in game order
    pub flagged: Vec<MoveRecord>,
}

impl AccuracySummary {
    pub fn from_records(records: &[MoveRecord]) -> Self {
        let total = records.len();
        let accurate = records.iter().filter(|r| r.accurate).count();

        Self {
            total,
            accurate,
            percentage: accuracy_percentage(accurate, total),
            flagged: records.iter().filter(|r| r.flagged).cloned().collect(),
        }
    }
}

/// Share of accurate moves in percent; zero when nothing was evaluated.
pub fn accuracy_percentage(accurate: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * accurate as f64 / total as f64
}
