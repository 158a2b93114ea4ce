//! Replayable game model: validated plies over shakmaty positions.
//!
//! Positions are plain values (`Chess: Clone`), so any speculative line is
//! built on an owned clone. Only [`Replay::advance`] moves the canonical
//! position forward, and only by the ply that was actually played.

use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{Chess, Color, Move, Position};

use crate::error::GameError;
use crate::game_data::{GameData, GameMetadata};
use crate::pgn;

/// One half-move of the game.
#[derive(Debug, Clone)]
pub struct Ply {
    /// 1-based half-move index
    pub index: usize,
    pub side_to_move: Color,
    pub mv: Move,
    /// SAN with check/mate suffix, computed on the position before the move
    pub notation: String,
}

/// A fully validated game starting from the standard position.
#[derive(Debug, Clone)]
pub struct Game {
    pub metadata: GameMetadata,
    plies: Vec<Ply>,
}

impl Game {
    /// Parse and validate a PGN document.
    pub fn from_pgn(pgn_text: &str) -> Result<Self, GameError> {
        Self::from_game_data(pgn::parse_pgn(pgn_text)?)
    }

    pub fn from_game_data(data: GameData) -> Result<Self, GameError> {
        Self::from_san_moves(data.metadata, &data.moves)
    }

    /// Replay SAN moves from the start position, rejecting anything illegal.
    pub fn from_san_moves<S: AsRef<str>>(
        metadata: GameMetadata,
        san_moves: &[S],
    ) -> Result<Self, GameError> {
        let mut pos = Chess::default();
        let mut plies = Vec::with_capacity(san_moves.len());

        for (i, san_str) in san_moves.iter().enumerate() {
            let san_str = san_str.as_ref().trim();
            let index = i + 1;

            let san_plus: SanPlus = san_str.parse().map_err(|e| GameError::InvalidSan {
                ply: index,
                san: san_str.to_string(),
                reason: format!("{e}"),
            })?;
            let mv = san_plus
                .san
                .to_move(&pos)
                .map_err(|e| GameError::IllegalMove {
                    ply: index,
                    san: san_str.to_string(),
                    reason: format!("{e}"),
                })?;

            plies.push(Ply {
                index,
                side_to_move: pos.turn(),
                notation: notation(&pos, &mv),
                mv: mv.clone(),
            });
            pos.play_unchecked(mv);
        }

        Ok(Self { metadata, plies })
    }

    pub fn plies(&self) -> &[Ply] {
        &self.plies
    }

    pub fn len(&self) -> usize {
        self.plies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plies.is_empty()
    }

    /// Start a fresh canonical replay. Games can be replayed any number of times.
    pub fn replay(&self) -> Replay {
        Replay {
            position: Chess::default(),
        }
    }
}

/// The canonical position walking through a game.
#[derive(Debug, Clone)]
pub struct Replay {
    position: Chess,
}

impl Replay {
    pub fn position(&self) -> &Chess {
        &self.position
    }

    /// Independent copy for "what if" probing.
    pub fn snapshot(&self) -> Chess {
        self.position.clone()
    }

    /// Advance by the ply actually played.
    pub fn advance(&mut self, ply: &Ply) {
        self.position.play_unchecked(ply.mv.clone());
    }
}

/// Standard algebraic notation of a legal move, including `+` or `#`.
pub fn notation(pos: &Chess, mv: &Move) -> String {
    let mut after = pos.clone();
    SanPlus::from_move_and_play_unchecked(&mut after, mv.clone()).to_string()
}

/// Resolve an engine move (UCI, e.g. `e2e4`) against a position.
pub fn uci_to_move(pos: &Chess, uci: &str) -> Result<Move, GameError> {
    let uci_move: UciMove = uci.parse().map_err(|e| GameError::InvalidUci {
        uci: uci.to_string(),
        reason: format!("{e}"),
    })?;
    uci_move.to_move(pos).map_err(|e| GameError::InvalidUci {
        uci: uci.to_string(),
        reason: format!("{e}"),
    })
}

/// Play a move on an owned copy, leaving the original untouched.
pub fn play_on_copy(pos: &Chess, mv: &Move) -> Chess {
    let mut branch = pos.clone();
    branch.play_unchecked(mv.clone());
    branch
}
