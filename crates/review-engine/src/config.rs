//! Review configuration from environment variables.

use std::env;

use crate::book::DEFAULT_BOOK_DEPTH;
use crate::error::ReviewError;

#[derive(Clone, Debug)]
pub struct ReviewConfig {
    /// Path to the UCI engine binary
    pub engine_path: String,

    /// Path to the opening-line table
    pub book_path: String,

    /// Max full-move number treated as book
    pub book_max_depth: u32,

    /// Per-position engine budget in milliseconds
    pub movetime_ms: u64,

    /// Optional whole-review deadline in seconds
    pub deadline_secs: Option<u64>,

    /// Optional commentary endpoint
    pub commentary: Option<CommentaryConfig>,
}

#[derive(Clone, Debug)]
pub struct CommentaryConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

impl ReviewConfig {
    /// Load configuration from environment variables. Unset variables fall
    /// back to defaults; set-but-garbled values are configuration errors.
    pub fn load() -> Result<Self, ReviewError> {
        let engine_path =
            env::var("ENGINE_PATH").unwrap_or_else(|_| "/usr/local/bin/stockfish".to_string());

        let book_path = env::var("BOOK_PATH").unwrap_or_else(|_| "data/openings.csv".to_string());

        let book_max_depth = parse_env(
            "BOOK_MAX_DEPTH",
            DEFAULT_BOOK_DEPTH,
            "BOOK_MAX_DEPTH must be an integer",
        )?;

        let movetime_ms = parse_env("MOVETIME_MS", 300, "MOVETIME_MS must be an integer")?;

        let deadline_secs = match env::var("REVIEW_DEADLINE_SECS") {
            Ok(v) => Some(
                v.parse()
                    .map_err(|_| ReviewError::Config("REVIEW_DEADLINE_SECS must be an integer"))?,
            ),
            Err(_) => None,
        };

        let commentary = match (
            env::var("COMMENTARY_API_URL").ok(),
            env::var("COMMENTARY_API_KEY").ok(),
        ) {
            (Some(api_url), Some(api_key)) => Some(CommentaryConfig {
                api_url,
                api_key,
                model: env::var("COMMENTARY_MODEL")
                    .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            engine_path,
            book_path,
            book_max_depth,
            movetime_ms,
            deadline_secs,
            commentary,
        })
    }
}

fn parse_env<T: std::str::FromStr>(
    name: &str,
    default: T,
    err: &'static str,
) -> Result<T, ReviewError> {
    match env::var(name) {
        Ok(v) => v.parse().map_err(|_| ReviewError::Config(err)),
        Err(_) => Ok(default),
    }
}
