//! Review error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("no moves found in input")]
    EmptyGame,

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("invalid move at ply {ply}: {uci}")]
    InvalidMove { ply: usize, uci: String },

    #[error("invalid starting position: {0}")]
    InvalidPosition(String),

    #[error("Opening book load failed: {0}")]
    BookLoad(String),

    #[error("review deadline exceeded")]
    DeadlineExceeded,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
