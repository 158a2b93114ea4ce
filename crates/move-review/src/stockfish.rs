//! Stockfish engine session using UCI protocol (async I/O)

use shakmaty::fen::Fen;
use shakmaty::{Chess, EnPassantMode, Position};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::engine::{AnalysisPort, PovScore, PvLine, Score, SearchBudget};
use crate::error::ReviewError;

/// One running Stockfish process.
///
/// Create it at the start of a review and call [`StockfishEngine::quit`] when
/// done; dropping it kills the process as a fallback.
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    multipv: u32,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn new(config: &EngineConfig) -> Result<Self, ReviewError> {
        let mut process = Command::new(&config.stockfish_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ReviewError::Stockfish(format!(
                    "Failed to spawn Stockfish at {}: {e}",
                    config.stockfish_path
                ))
            })?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| ReviewError::Stockfish("Stockfish stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| ReviewError::Stockfish("Stockfish stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout,
            multipv: 1,
        };

        engine.send("uci").await?;
        engine.wait_for("uciok").await?;

        engine
            .send(&format!("setoption name Threads value {}", config.threads))
            .await?;
        engine
            .send(&format!("setoption name Hash value {}", config.hash_mb))
            .await?;
        engine.send("setoption name UCI_AnalyseMode value true").await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        info!(
            path = %config.stockfish_path,
            threads = config.threads,
            hash_mb = config.hash_mb,
            "Stockfish ready"
        );
        Ok(engine)
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), ReviewError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| ReviewError::Stockfish(format!("Failed to write to Stockfish: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| ReviewError::Stockfish(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    /// Read one trimmed line; end of output means the process is gone.
    async fn read_line(&mut self) -> Result<String, ReviewError> {
        let mut line = String::new();
        let n = self
            .stdout
            .read_line(&mut line)
            .await
            .map_err(|e| ReviewError::Stockfish(format!("Failed to read from Stockfish: {e}")))?;
        if n == 0 {
            return Err(ReviewError::Stockfish("Stockfish closed its output".into()));
        }
        let trimmed = line.trim().to_string();
        debug!(line = %trimmed, "SF >");
        Ok(trimmed)
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), ReviewError> {
        loop {
            if self.read_line().await? == expected {
                return Ok(());
            }
        }
    }

    async fn set_multipv(&mut self, lines: u32) -> Result<(), ReviewError> {
        if self.multipv != lines {
            self.send(&format!("setoption name MultiPV value {lines}"))
                .await?;
            self.multipv = lines;
        }
        Ok(())
    }

    /// Run one search and collect the final line per multipv slot.
    async fn search(
        &mut self,
        fen: &str,
        budget: SearchBudget,
        lines: u32,
    ) -> Result<Vec<(Vec<String>, Score)>, ReviewError> {
        self.set_multipv(lines).await?;
        self.send(&format!("position fen {fen}")).await?;
        self.send(&budget.go_command()).await?;

        let mut collector = LineCollector::new(lines);
        loop {
            let line = self.read_line().await?;
            if collector.feed(&line) {
                break;
            }
        }
        collector
            .finish()
            .inspect_err(|e| debug!(fen, error = %e, "Search produced no usable line"))
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
        info!("Stockfish stopped");
    }
}

impl AnalysisPort for StockfishEngine {
    async fn analyze(
        &mut self,
        position: &Chess,
        budget: SearchBudget,
        lines: u32,
    ) -> Result<Vec<PvLine>, ReviewError> {
        let fen = Fen::from_position(position, EnPassantMode::Legal).to_string();
        let pov = position.turn();

        let found = self.search(&fen, budget, lines.max(1)).await?;
        Ok(found
            .into_iter()
            .map(|(moves, score)| PvLine {
                moves,
                score: PovScore { pov, score },
            })
            .collect())
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

/// Keeps the latest exact `info ... score` line per multipv slot until `bestmove`.
struct LineCollector {
    slots: Vec<Option<(Vec<String>, Score)>>,
}

impl LineCollector {
    fn new(lines: u32) -> Self {
        Self {
            slots: vec![None; lines.max(1) as usize],
        }
    }

    /// Returns true once the search is over.
    fn feed(&mut self, line: &str) -> bool {
        if line.starts_with("bestmove") {
            return true;
        }
        if !line.starts_with("info") || is_bound(line) {
            return false;
        }
        let Some(score) = parse_score(line) else {
            return false;
        };
        let idx = parse_multipv_index(line).unwrap_or(1).max(1) - 1;
        if let Some(slot) = self.slots.get_mut(idx as usize) {
            *slot = Some((parse_pv(line), score));
        }
        false
    }

    fn finish(self) -> Result<Vec<(Vec<String>, Score)>, ReviewError> {
        let found: Vec<_> = self.slots.into_iter().flatten().collect();
        if found.is_empty() {
            return Err(ReviewError::Stockfish(
                "No score reported before bestmove".into(),
            ));
        }
        Ok(found)
    }
}

/// Value following `key` in a whitespace-separated info line.
fn token_after<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let mut parts = line.split_whitespace();
    while let Some(part) = parts.next() {
        if part == key {
            return parts.next();
        }
    }
    None
}

fn is_bound(line: &str) -> bool {
    line.split_whitespace()
        .any(|p| p == "lowerbound" || p == "upperbound")
}

/// Parse `score cp N` or `score mate N` from an info line
fn parse_score(line: &str) -> Option<Score> {
    let mut parts = line.split_whitespace().skip_while(|p| *p != "score").skip(1);
    let kind = parts.next()?;
    let value: i32 = parts.next()?.parse().ok()?;
    match kind {
        "cp" => Some(Score::Cp(value)),
        "mate" => Some(Score::Mate(value)),
        _ => None,
    }
}

/// Parse multipv index from info line
fn parse_multipv_index(line: &str) -> Option<u32> {
    token_after(line, "multipv")?.parse().ok()
}

/// Parse PV moves from info line
fn parse_pv(line: &str) -> Vec<String> {
    line.split_whitespace()
        .skip_while(|p| *p != "pv")
        .skip(1)
        .take_while(|p| !p.starts_with("bmc") && *p != "string")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive a collector over a canned transcript the way `search` drives it
    /// over the process output.
    fn collect_lines<'a>(
        transcript: impl IntoIterator<Item = &'a str>,
        lines: u32,
    ) -> Result<Vec<(Vec<String>, Score)>, ReviewError> {
        let mut collector = LineCollector::new(lines);
        for line in transcript {
            if collector.feed(line) {
                return collector.finish();
            }
        }
        Err(ReviewError::Stockfish("Stockfish closed its output".into()))
    }

    #[test]
    fn test_collect_keeps_last_exact_line() {
        let transcript = [
            "info string NNUE evaluation using nn-1.nnue",
            "info depth 10 score cp 20 nodes 900 pv e2e4 e7e5",
            "info depth 11 score cp 31 nodes 1800 pv d2d4 d7d5",
            "info depth 12 score cp 90 lowerbound nodes 2500 pv c2c4",
            "info depth 12 currmove c2c4 currmovenumber 1",
            "bestmove d2d4 ponder d7d5",
        ];
        let found = collect_lines(transcript, 1).unwrap();
        assert_eq!(found, vec![(vec!["d2d4".to_string(), "d7d5".to_string()], Score::Cp(31))]);
    }

    #[test]
    fn test_collect_bound_only_final_depth_falls_back_to_previous() {
        let transcript = [
            "info depth 8 score cp -15 pv g8f6",
            "info depth 9 score cp -60 upperbound pv g8f6",
            "info depth 9 score cp -70 upperbound pv g8f6",
            "bestmove g8f6",
        ];
        let found = collect_lines(transcript, 1).unwrap();
        assert_eq!(found[0].1, Score::Cp(-15));
    }

    #[test]
    fn test_collect_terminal_mate_without_pv() {
        let found = collect_lines(["info depth 0 score mate 0", "bestmove (none)"], 1).unwrap();
        assert_eq!(found, vec![(Vec::new(), Score::Mate(0))]);
    }

    #[test]
    fn test_collect_multipv_slots() {
        let transcript = [
            "info depth 14 multipv 1 score cp 40 pv e2e4",
            "info depth 14 multipv 2 score cp 25 pv d2d4",
            "info depth 15 multipv 2 score cp 28 pv g1f3",
            "info depth 15 multipv 1 score mate 7 pv e2e4 e7e5",
            "info depth 15 multipv 3 score cp 10 pv c2c4",
            "bestmove e2e4",
        ];
        let found = collect_lines(transcript, 2).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], (vec!["e2e4".to_string(), "e7e5".to_string()], Score::Mate(7)));
        assert_eq!(found[1], (vec!["g1f3".to_string()], Score::Cp(28)));
    }

    #[test]
    fn test_collect_without_score_is_an_error() {
        let err = collect_lines(["info string no eval", "bestmove e2e4"], 1).unwrap_err();
        assert_eq!(err.stage(), "engine");
    }

    #[test]
    fn test_collect_missing_bestmove_is_an_error() {
        let err = collect_lines(["info depth 5 score cp 12 pv e2e4"], 1).unwrap_err();
        assert!(matches!(err, ReviewError::Stockfish(_)));
    }

    #[test]
    fn test_parse_cp() {
        let line = "info depth 20 seldepth 25 multipv 1 score cp 35 nodes 100000 pv e2e4";
        assert_eq!(parse_score(line), Some(Score::Cp(35)));
    }

    #[test]
    fn test_parse_mate() {
        let line = "info depth 20 score mate -3 nodes 100000 pv e2e4";
        assert_eq!(parse_score(line), Some(Score::Mate(-3)));
        assert_eq!(parse_score("info depth 0 score mate 0"), Some(Score::Mate(0)));
    }

    #[test]
    fn test_parse_score_missing() {
        assert_eq!(parse_score("info string NNUE evaluation enabled"), None);
        assert_eq!(parse_score("info depth 5 currmove e2e4 currmovenumber 1"), None);
    }

    #[test]
    fn test_parse_pv() {
        let line = "info depth 20 score cp 35 pv e2e4 e7e5 g1f3";
        assert_eq!(parse_pv(line), vec!["e2e4", "e7e5", "g1f3"]);
        assert!(parse_pv("info depth 0 score mate 0").is_empty());
    }

    #[test]
    fn test_parse_multipv_index() {
        let line = "info depth 18 multipv 2 score cp -12 pv d2d4";
        assert_eq!(parse_multipv_index(line), Some(2));
        assert_eq!(parse_multipv_index("info depth 18 score cp 3 pv d2d4"), None);
    }

    #[test]
    fn test_bound_lines_are_detected() {
        assert!(is_bound("info depth 12 score cp 40 lowerbound nodes 5000 pv e2e4"));
        assert!(!is_bound("info depth 12 score cp 40 nodes 5000 pv e2e4"));
    }
}
