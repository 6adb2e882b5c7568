//! Game review worker.
//!
//! Reads a PGN file, replays the game against a local UCI engine, and
//! prints the structured review as JSON.

use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{info, warn};

use review_engine::book::OpeningBook;
use review_engine::commentary::CommentaryClient;
use review_engine::config::ReviewConfig;
use review_engine::engine::{SearchLimit, UciEngine};
use review_engine::review::{review_game, ReviewOptions, ReviewRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let config = ReviewConfig::load()?;
    info!(engine_path = %config.engine_path, "Review config loaded");

    let pgn_path = std::env::args()
        .nth(1)
        .context("usage: review-engine <game.pgn>")?;
    let pgn = std::fs::read_to_string(&pgn_path)
        .with_context(|| format!("failed to read {pgn_path}"))?;

    let game = chess_core::pgn::parse_pgn(&pgn)?;
    let moves = chess_core::replay::san_to_uci(&game.moves)?;

    let book = match OpeningBook::load_csv(&config.book_path, config.book_max_depth) {
        Ok(book) => {
            info!(positions = book.len(), "Opening book loaded");
            book
        }
        Err(e) => {
            warn!(error = %e, "Opening book unavailable, book detection disabled");
            OpeningBook::empty(config.book_max_depth)
        }
    };

    let request = ReviewRequest {
        white: game.metadata.white.clone(),
        black: game.metadata.black.clone(),
        moves,
        start_fen: None,
    };
    let options = ReviewOptions {
        limit: SearchLimit::MoveTime(config.movetime_ms),
        deadline: config
            .deadline_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs)),
    };

    let mut engine = UciEngine::spawn(&config.engine_path).await?;
    let result = review_game(&mut engine, &book, &request, &options).await;
    // The session is released on both exit paths
    engine.quit().await;
    let mut outcome = result?;

    if let Some(commentary_config) = config.commentary.clone() {
        let client = CommentaryClient::new(commentary_config);
        outcome.commentary = client.review_pgn(&game.pgn).await;
    }

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}
