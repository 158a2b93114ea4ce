//! PGN reading: tag pairs and mainline SAN via `pgn_reader`.

use std::ops::ControlFlow;

use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};

use crate::error::GameError;
use crate::game_data::{GameData, GameMetadata};

const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Tags collected during header parsing.
struct GameTags {
    metadata: GameMetadata,
    setup: Option<String>,
    fen: Option<String>,
}

impl Default for GameTags {
    fn default() -> Self {
        Self {
            metadata: GameMetadata {
                white: "Unknown".to_string(),
                black: "Unknown".to_string(),
                result: "*".to_string(),
                ..GameMetadata::default()
            },
            setup: None,
            fen: None,
        }
    }
}

/// Visitor that keeps the headers we report on and the mainline moves.
///
/// Variations are skipped wholesale, however deeply nested. Comments and NAGs
/// are ignored.
struct MainlineCollector;

impl Visitor for MainlineCollector {
    type Tags = GameTags;
    type Movetext = GameData;
    type Output = Result<GameData, GameError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, GameTags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut GameTags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let value = value.decode_utf8_lossy().into_owned();
        let meta = &mut tags.metadata;
        match name {
            b"White" => meta.white = value,
            b"Black" => meta.black = value,
            b"Result" => meta.result = value,
            b"Date" => meta.date = Some(value),
            b"TimeControl" => meta.time_control = Some(value),
            b"ECO" => meta.eco = Some(value),
            b"Event" => meta.event = Some(value),
            b"Link" => meta.link = Some(value),
            b"SetUp" => tags.setup = Some(value),
            b"FEN" => tags.fen = Some(value),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: GameTags) -> ControlFlow<Self::Output, GameData> {
        // Filter non-standard positions
        if let Some(fen) = tags.fen {
            if tags.setup.as_deref() != Some("0") && fen.trim() != STANDARD_START_FEN {
                return ControlFlow::Break(Err(GameError::NonStandardStart(fen)));
            }
        }

        ControlFlow::Continue(GameData {
            metadata: tags.metadata,
            moves: Vec::new(),
        })
    }

    fn begin_variation(&mut self, _: &mut GameData) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn san(&mut self, data: &mut GameData, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        data.moves.push(san_plus.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, data: GameData) -> Self::Output {
        Ok(data)
    }
}

/// Read game number `index` (1-based) out of PGN text.
///
/// Returns `Ok(None)` when the text holds fewer games. Games before `index`
/// are read and discarded, so a bad earlier game does not block a later one.
pub fn read_game(text: &str, index: usize) -> Result<Option<GameData>, GameError> {
    let mut reader = Reader::new(text.as_bytes());
    let mut collector = MainlineCollector;
    let mut current = 0;

    while let Some(parsed) = reader
        .read_game(&mut collector)
        .map_err(|e| GameError::Read(e.to_string()))?
    {
        current += 1;
        if current == index {
            return parsed.map(Some);
        }
    }
    Ok(None)
}

/// Parse the first game of a PGN document.
pub fn parse_pgn(pgn: &str) -> Result<GameData, GameError> {
    read_game(pgn, 1)?.ok_or(GameError::NoGame)
}
