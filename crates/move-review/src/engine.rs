//! Engine analysis port: the narrow interface the review pipeline queries.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Color};

use crate::error::ReviewError;

/// Resource limit handed to the engine for a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchBudget {
    MoveTime(Duration),
    Depth(u32),
}

impl SearchBudget {
    /// UCI `go` command for this budget
    pub fn go_command(&self) -> String {
        match self {
            SearchBudget::MoveTime(d) => format!("go movetime {}", d.as_millis()),
            SearchBudget::Depth(depth) => format!("go depth {depth}"),
        }
    }

    pub fn is_positive(&self) -> bool {
        match self {
            SearchBudget::MoveTime(d) => !d.is_zero(),
            SearchBudget::Depth(depth) => *depth > 0,
        }
    }
}

impl fmt::Display for SearchBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchBudget::MoveTime(d) => write!(f, "{}s", d.as_secs_f64()),
            SearchBudget::Depth(depth) => write!(f, "depth={depth}"),
        }
    }
}

/// Raw engine score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Score {
    /// Centipawns
    Cp(i32),
    /// Mate in N moves (positive = the point-of-view side mates, `0` = it is mated)
    Mate(i32),
}

/// A score together with the side it is expressed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PovScore {
    #[serde(with = "color_serde")]
    pub pov: Color,
    pub score: Score,
}

/// One ranked line returned by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvLine {
    /// Principal variation in UCI notation; empty for terminal positions
    pub moves: Vec<String>,
    pub score: PovScore,
}

impl PvLine {
    pub fn first_move(&self) -> Option<&str> {
        self.moves.first().map(String::as_str)
    }
}

/// Anything that can analyze a position: the Stockfish session, or a scripted
/// stand-in under test. Queries are issued one at a time through `&mut self`.
#[allow(async_fn_in_trait)]
pub trait AnalysisPort {
    /// Analyze `position` within `budget`, returning up to `lines` ranked lines,
    /// best first.
    async fn analyze(
        &mut self,
        position: &Chess,
        budget: SearchBudget,
        lines: u32,
    ) -> Result<Vec<PvLine>, ReviewError>;
}

/// Top line of an analysis, or an error if the engine returned nothing.
pub fn top_line(lines: Vec<PvLine>) -> Result<PvLine, ReviewError> {
    lines
        .into_iter()
        .next()
        .ok_or_else(|| ReviewError::Stockfish("Engine returned no analysis lines".into()))
}

pub(crate) mod color_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use shakmaty::Color;

    pub fn serialize<S: Serializer>(color: &Color, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(if *color == Color::White { "white" } else { "black" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
        match String::deserialize(d)?.as_str() {
            "white" => Ok(Color::White),
            "black" => Ok(Color::Black),
            other => Err(serde::de::Error::custom(format!("unknown color '{other}'"))),
        }
    }
}
