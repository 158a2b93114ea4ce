#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use chess_core::{Game, GameMetadata};
use move_review::config::ReviewSettings;
use move_review::engine::{AnalysisPort, PovScore, PvLine, Score, SearchBudget};
use move_review::error::ReviewError;
use move_review::sampler::Sampling;
use shakmaty::fen::Fen;
use shakmaty::{Chess, Color, EnPassantMode, Position};

/// One scripted engine answer, from the side to move's point of view.
#[derive(Debug, Clone)]
pub struct Reply {
    pub best: Option<&'static str>,
    pub score: Score,
}

pub fn cp(best: &'static str, cp: i32) -> Reply {
    Reply {
        best: Some(best),
        score: Score::Cp(cp),
    }
}

pub fn cp_only(cp: i32) -> Reply {
    Reply {
        best: None,
        score: Score::Cp(cp),
    }
}

pub fn mate(best: Option<&'static str>, n: i32) -> Reply {
    Reply {
        best,
        score: Score::Mate(n),
    }
}

/// A position the fake engine was asked about.
#[derive(Debug, Clone)]
pub struct Query {
    pub fen: String,
    pub turn: Color,
    pub budget: SearchBudget,
}

/// Engine stand-in that answers queries from a FIFO script.
///
/// Running out of script is reported as an engine failure, like a dead process.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    replies: VecDeque<Reply>,
    pub queries: Vec<Query>,
}

impl ScriptedEngine {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: replies.into(),
            queries: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl AnalysisPort for ScriptedEngine {
    async fn analyze(
        &mut self,
        position: &Chess,
        budget: SearchBudget,
        _lines: u32,
    ) -> Result<Vec<PvLine>, ReviewError> {
        self.queries.push(Query {
            fen: fen(position),
            turn: position.turn(),
            budget,
        });

        let reply = self
            .replies
            .pop_front()
            .ok_or_else(|| ReviewError::Stockfish("Stockfish closed its output".into()))?;

        Ok(vec![PvLine {
            moves: reply.best.map(|m| vec![m.to_string()]).unwrap_or_default(),
            score: PovScore {
                pov: position.turn(),
                score: reply.score,
            },
        }])
    }
}

pub fn fen(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

pub fn game(moves: &[&str]) -> Game {
    Game::from_san_moves(GameMetadata::default(), moves).expect("legal test game")
}

pub fn settings(tracked: Color, trials: u32) -> ReviewSettings {
    let sampling = Sampling {
        trials,
        budget: SearchBudget::MoveTime(Duration::from_millis(500)),
    };
    ReviewSettings::new(tracked, sampling, 50).expect("valid test settings")
}
