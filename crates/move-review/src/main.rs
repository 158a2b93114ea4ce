//! Move Review
//!
//! Replays a finished game through Stockfish, prints the evaluation table and
//! the tracked player's inaccurate moves, and reports an overall accuracy.

use std::path::PathBuf;

use clap::Parser;
use shakmaty::Color;
use tracing::{error, info};

use move_review::config::{
    resolve_sampling, AnalysisMode, EngineConfig, ReviewSettings, TrackedSide, DEFAULT_THRESHOLD,
};
use move_review::pipeline::run_review;
use move_review::report::render_text;
use move_review::source::load_game;

#[derive(Parser, Debug)]
#[command(name = "move-review", about = "Engine-assisted move quality review of a chess game")]
struct Cli {
    /// PGN file containing the game
    pgn: PathBuf,

    /// Which game of the file to review (1-based)
    #[arg(long, default_value_t = 1)]
    game: usize,

    /// Side whose moves are judged
    #[arg(long, value_enum, default_value_t = TrackedSide::White)]
    color: TrackedSide,

    /// Analysis preset
    #[arg(long, value_enum, default_value_t = AnalysisMode::VeryFast)]
    mode: AnalysisMode,

    /// Override the preset's number of samples per position
    #[arg(long)]
    trials: Option<u32>,

    /// Override the preset's budget with a fixed time per query
    #[arg(long, conflicts_with = "depth")]
    movetime_ms: Option<u64>,

    /// Override the preset's budget with a fixed search depth
    #[arg(long)]
    depth: Option<u32>,

    /// Average error (centipawns) at or above which a move is inaccurate
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: u32,

    /// Print the review as JSON instead of a text table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let settings = resolve_sampling(cli.mode, cli.trials, cli.movetime_ms, cli.depth)
        .and_then(|sampling| ReviewSettings::new(Color::from(cli.color), sampling, cli.threshold))
        .inspect_err(|e| error!(stage = e.stage(), error = %e, "Invalid settings"))?;
    let engine_config = EngineConfig::from_env()
        .inspect_err(|e| error!(stage = e.stage(), error = %e, "Invalid engine config"))?;

    info!(
        pgn = %cli.pgn.display(),
        mode = ?cli.mode,
        color = ?cli.color,
        stockfish_path = %engine_config.stockfish_path,
        "Config loaded"
    );

    let game = load_game(&cli.pgn, cli.game)
        .await
        .inspect_err(|e| error!(stage = e.stage(), error = %e, "Failed to load game"))?;

    let review = run_review(&engine_config, &game, &settings)
        .await
        .inspect_err(|e| error!(stage = e.stage(), error = %e, "Review failed"))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&review)?);
    } else {
        print!("{}", render_text(&review.report, &review.accuracy));
    }

    Ok(())
}
