//! Report assembly and plain-text rendering.

use std::fmt::Write;

use chess_core::GameMetadata;
use serde::Serialize;

use crate::accuracy::AccuracySummary;
use crate::move_errors::MoveRecord;
use crate::trend::{trend_series, PlyEvaluation, TrendPoint};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveCell {
    pub notation: String,
    pub eval: f64,
}

/// One numbered move pair of the table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub move_number: usize,
    pub white: MoveCell,
    pub black: Option<MoveCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameReport {
    pub metadata: GameMetadata,
    pub rows: Vec<ReportRow>,
    pub trend: Vec<TrendPoint>,
}

impl GameReport {
    /// Pair up ply evaluations into table rows. Games always start with White.
    pub fn from_evaluations(metadata: GameMetadata, evaluations: &[PlyEvaluation]) -> Self {
        let cell = |e: &PlyEvaluation| MoveCell {
            notation: e.notation.clone(),
            eval: e.eval,
        };

        let rows = evaluations
            .chunks(2)
            .enumerate()
            .map(|(i, pair)| ReportRow {
                move_number: i + 1,
                white: cell(&pair[0]),
                black: pair.get(1).map(cell),
            })
            .collect();

        Self {
            metadata,
            rows,
            trend: trend_series(evaluations),
        }
    }

    pub fn table_lines(&self) -> Vec<String> {
        self.rows.iter().map(table_line).collect()
    }
}

/// Signed evaluation: `+24`, `-130`, `+0`. Fractions are truncated toward zero.
pub fn format_eval(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{}", value.trunc() as i64)
}

fn table_line(row: &ReportRow) -> String {
    let (black_notation, black_eval) = match &row.black {
        Some(cell) => (cell.notation.as_str(), format_eval(cell.eval)),
        None => ("", String::new()),
    };
    format!(
        "{}. | {} | {} | {} | {} |",
        row.move_number,
        row.white.notation,
        format_eval(row.white.eval),
        black_notation,
        black_eval
    )
}

pub fn flagged_line(record: &MoveRecord) -> String {
    format!(
        "{}. {} -> {}  avg. diff: {}",
        record.move_index,
        record.played,
        record.best,
        record.avg_error.trunc() as i64
    )
}

pub fn accuracy_line(summary: &AccuracySummary) -> String {
    format!("Overall Accuracy: {:.2}%", summary.percentage)
}

/// Full human-readable report: header, evaluation table, flagged moves, accuracy.
pub fn render_text(report: &GameReport, accuracy: &AccuracySummary) -> String {
    let mut out = String::new();
    let meta = &report.metadata;

    let _ = writeln!(out, "{} vs {} ({})", meta.white, meta.black, meta.result);
    if let Some(event) = &meta.event {
        let _ = writeln!(out, "Event: {event}");
    }
    if let Some(date) = &meta.date {
        let _ = writeln!(out, "Date: {date}");
    }

    let _ = writeln!(out, "\nEvaluation table:");
    for line in report.table_lines() {
        let _ = writeln!(out, "{line}");
    }

    let _ = writeln!(out, "\nMove errors analysis:");
    for record in &accuracy.flagged {
        let _ = writeln!(out, "{}", flagged_line(record));
    }
    let _ = writeln!(out, "{}", accuracy_line(accuracy));

    out
}
