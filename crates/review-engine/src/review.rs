//! The review walk: one pass over the game that drives evaluation,
//! book/phase state, classification, and aggregation.

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use shakmaty::{fen::Fen, uci::UciMove, CastlingMode, Chess, Color, EnPassantMode, Position};
use tracing::info;

use crate::aggregate::{phase_rating, PlayerSummary};
use crate::book::{OpeningBook, PositionKey};
use crate::classify::{classify_move, Classification};
use crate::engine::{Evaluator, SearchLimit};
use crate::error::ReviewError;
use crate::eval::Eval;
use crate::phase::{detect_phase, GamePhase};

/// How many continuation moves are reported with each evaluation.
const FOLLOW_UP_LEN: usize = 5;

#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub white: String,
    pub black: String,
    /// Mainline in coordinate notation.
    pub moves: Vec<String>,
    /// Optional custom starting position; standard start when absent.
    pub start_fen: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReviewOptions {
    pub limit: SearchLimit,
    pub deadline: Option<Instant>,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            limit: SearchLimit::MoveTime(300),
            deadline: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveReport {
    pub move_number: u32,
    pub player: String,
    #[serde(rename = "move")]
    pub move_uci: String,
    /// Post-move evaluation in pawns, from White's perspective.
    pub evaluation: f64,
    /// Evaluation loss in pawns.
    pub evaluation_loss: f64,
    pub classification: Classification,
    pub phase: GamePhase,
    pub best_move_pre: Option<String>,
    pub follow_up_pre: Vec<String>,
    pub best_move_post: Option<String>,
    pub follow_up_post: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseSummary {
    pub rating: Classification,
    pub move_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub moves: Vec<MoveReport>,
    pub phases: HashMap<GamePhase, PhaseSummary>,
    pub players: HashMap<String, PlayerSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<serde_json::Value>,
}

/// Review one game against an analysis oracle.
///
/// The walk is strictly sequential: each move's evaluation depends on the
/// board produced by the previous one, and the engine session behind the
/// evaluator is single-query. Any error discards all partial state.
pub async fn review_game<E: Evaluator>(
    evaluator: &mut E,
    book: &OpeningBook,
    request: &ReviewRequest,
    options: &ReviewOptions,
) -> Result<ReviewOutcome, ReviewError> {
    if request.moves.is_empty() {
        return Err(ReviewError::EmptyGame);
    }

    let mut pos = starting_position(request.start_fen.as_deref())?;

    info!(
        white = %request.white,
        black = %request.black,
        moves = request.moves.len(),
        "Starting review"
    );

    // Evaluate the starting position once; every later pre-move evaluation
    // reuses the previous post-move result.
    check_deadline(options)?;
    let first = evaluator.evaluate(&fen_of(&pos), &options.limit).await?;
    let mut pre_eval = Eval::from_engine(first.cp, first.mate, pos.turn().is_white());
    let mut pre_pv = first.pv;

    let mut in_opening = true;
    let mut move_reports = Vec::with_capacity(request.moves.len());
    let mut phase_moves: HashMap<GamePhase, Vec<Classification>> = HashMap::new();
    let mut white_summary = PlayerSummary::default();
    let mut black_summary = PlayerSummary::default();

    for (i, uci_str) in request.moves.iter().enumerate() {
        let ply = i + 1;
        let mover = pos.turn();

        let invalid = || ReviewError::InvalidMove {
            ply,
            uci: uci_str.clone(),
        };
        let uci: UciMove = uci_str.parse().map_err(|_| invalid())?;
        let mv = uci.to_move(&pos).map_err(|_| invalid())?;

        let is_forced = pos.legal_moves().len() == 1;

        let key_before = PositionKey::from_position(&pos);
        let fullmove_before = pos.fullmoves().get();
        let is_book = book.is_book_move(&key_before, fullmove_before, uci_str);

        pos.play_unchecked(mv);

        check_deadline(options)?;
        let post_line = evaluator.evaluate(&fen_of(&pos), &options.limit).await?;
        let post_eval = Eval::from_engine(post_line.cp, post_line.mate, pos.turn().is_white());

        // Phase uses the flag as it stood when the move was played, so the
        // move that leaves book still counts as an opening move.
        let phase = detect_phase(pos.board(), in_opening);
        if in_opening {
            let key_after = PositionKey::from_position(&pos);
            if book.lookup(&key_after, pos.fullmoves().get()).is_none() {
                in_opening = false;
            }
        }

        let classification = if is_forced {
            Classification::Forced
        } else {
            classify_move(
                pre_eval,
                post_eval,
                mover,
                uci_str,
                pre_pv.first().map(String::as_str),
                is_book,
            )
        };

        let eval_loss = (pre_eval.cp - post_eval.cp).abs();

        move_reports.push(MoveReport {
            move_number: ply as u32,
            player: color_label(mover).to_string(),
            move_uci: uci_str.clone(),
            evaluation: f64::from(post_eval.cp) / 100.0,
            evaluation_loss: f64::from(eval_loss) / 100.0,
            classification,
            phase,
            best_move_pre: pre_pv.first().cloned(),
            follow_up_pre: pre_pv.iter().take(FOLLOW_UP_LEN).cloned().collect(),
            best_move_post: post_line.pv.first().cloned(),
            follow_up_post: post_line.pv.iter().take(FOLLOW_UP_LEN).cloned().collect(),
        });

        phase_moves.entry(phase).or_default().push(classification);
        match mover {
            Color::White => white_summary.record(classification),
            Color::Black => black_summary.record(classification),
        }

        pre_eval = post_eval;
        pre_pv = post_line.pv;
    }

    let phases = phase_moves
        .into_iter()
        .map(|(phase, classifications)| {
            let summary = PhaseSummary {
                rating: phase_rating(&classifications),
                move_count: classifications.len() as u32,
            };
            (phase, summary)
        })
        .collect();

    let mut players = HashMap::new();
    players.insert(request.white.clone(), white_summary);
    players.insert(request.black.clone(), black_summary);

    info!(moves = move_reports.len(), "Review complete");

    Ok(ReviewOutcome {
        moves: move_reports,
        phases,
        players,
        commentary: None,
    })
}

fn starting_position(start_fen: Option<&str>) -> Result<Chess, ReviewError> {
    match start_fen {
        None => Ok(Chess::default()),
        Some(fen_str) => {
            let fen: Fen = fen_str
                .parse()
                .map_err(|_| ReviewError::InvalidPosition(fen_str.to_string()))?;
            fen.into_position(CastlingMode::Standard)
                .map_err(|_| ReviewError::InvalidPosition(fen_str.to_string()))
        }
    }
}

fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

fn check_deadline(options: &ReviewOptions) -> Result<(), ReviewError> {
    if let Some(deadline) = options.deadline {
        if Instant::now() >= deadline {
            return Err(ReviewError::DeadlineExceeded);
        }
    }
    Ok(())
}

fn color_label(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}
