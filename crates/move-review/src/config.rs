//! Review configuration: engine settings from the environment, analysis
//! settings from the command line.

use std::env;
use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;
use shakmaty::Color;

use crate::engine::SearchBudget;
use crate::error::ReviewError;
use crate::sampler::Sampling;

/// Centipawn error at or above which a move stops counting as accurate.
pub const DEFAULT_THRESHOLD: u32 = 50;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Path to Stockfish binary
    pub stockfish_path: String,

    /// Search threads per engine process
    pub threads: u32,

    /// Transposition table size in MB
    pub hash_mb: u32,
}

impl EngineConfig {
    /// Load engine configuration from environment variables.
    /// Unset variables fall back to defaults; malformed ones are rejected.
    pub fn from_env() -> Result<Self, ReviewError> {
        let stockfish_path = env::var("STOCKFISH_PATH")
            .unwrap_or_else(|_| "/usr/local/bin/stockfish".to_string());

        let threads = parse_positive_var("STOCKFISH_THREADS", 1)
            .ok_or(ReviewError::Config("STOCKFISH_THREADS must be a positive integer"))?;

        let hash_mb = parse_positive_var("STOCKFISH_HASH_MB", 256)
            .ok_or(ReviewError::Config("STOCKFISH_HASH_MB must be a positive integer"))?;

        Ok(Self {
            stockfish_path,
            threads,
            hash_mb,
        })
    }
}

fn parse_positive_var(name: &str, default: u32) -> Option<u32> {
    match env::var(name) {
        Ok(v) => v.trim().parse().ok().filter(|n| *n > 0),
        Err(_) => Some(default),
    }
}

/// Side whose moves are judged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TrackedSide {
    White,
    Black,
}

impl From<TrackedSide> for Color {
    fn from(side: TrackedSide) -> Self {
        match side {
            TrackedSide::White => Color::White,
            TrackedSide::Black => Color::Black,
        }
    }
}

/// Analysis presets trading speed for stability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum AnalysisMode {
    /// 2 samples at 0.5 s
    #[default]
    VeryFast,
    /// 2 samples at 2 s
    Fast,
    /// 3 samples at 5 s
    InDepth,
    /// 3 samples at depth 20
    VeryInDepth,
}

impl AnalysisMode {
    pub fn sampling(self) -> Sampling {
        match self {
            AnalysisMode::VeryFast => Sampling {
                trials: 2,
                budget: SearchBudget::MoveTime(Duration::from_millis(500)),
            },
            AnalysisMode::Fast => Sampling {
                trials: 2,
                budget: SearchBudget::MoveTime(Duration::from_secs(2)),
            },
            AnalysisMode::InDepth => Sampling {
                trials: 3,
                budget: SearchBudget::MoveTime(Duration::from_secs(5)),
            },
            AnalysisMode::VeryInDepth => Sampling {
                trials: 3,
                budget: SearchBudget::Depth(20),
            },
        }
    }
}

/// Preset sampling with optional per-field overrides.
///
/// A time budget and a depth budget are mutually exclusive.
pub fn resolve_sampling(
    mode: AnalysisMode,
    trials: Option<u32>,
    movetime_ms: Option<u64>,
    depth: Option<u32>,
) -> Result<Sampling, ReviewError> {
    let mut sampling = mode.sampling();
    if let Some(trials) = trials {
        sampling.trials = trials;
    }
    sampling.budget = match (movetime_ms, depth) {
        (Some(ms), Some(depth)) => {
            return Err(ReviewError::Input(format!(
                "choose either a movetime ({ms} ms) or a depth ({depth}), not both"
            )));
        }
        (Some(ms), None) => SearchBudget::MoveTime(Duration::from_millis(ms)),
        (None, Some(depth)) => SearchBudget::Depth(depth),
        (None, None) => sampling.budget,
    };
    Ok(sampling)
}

/// Validated settings for one review run.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ReviewSettings {
    #[serde(serialize_with = "crate::engine::color_serde::serialize")]
    pub tracked: Color,
    pub sampling: Sampling,
    pub threshold: u32,
}

impl ReviewSettings {
    /// Reject out-of-range values before any engine is started.
    pub fn new(tracked: Color, sampling: Sampling, threshold: u32) -> Result<Self, ReviewError> {
        if sampling.trials == 0 {
            return Err(ReviewError::Input("number of trials must be at least 1".into()));
        }
        if !sampling.budget.is_positive() {
            return Err(ReviewError::Input(format!(
                "search budget must be positive, got {}",
                sampling.budget
            )));
        }
        if threshold == 0 {
            return Err(ReviewError::Input("flag threshold must be at least 1".into()));
        }

        Ok(Self {
            tracked,
            sampling,
            threshold,
        })
    }
}
