pub use chess_core;

pub mod accuracy;
pub mod config;
pub mod engine;
pub mod error;
pub mod move_errors;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod sampler;
pub mod source;
pub mod stockfish;
pub mod trend;
