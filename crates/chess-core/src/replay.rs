//! Replay of SAN mainlines into coordinate (UCI) notation.

use shakmaty::{san::San, CastlingMode, Chess, Position};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("invalid move at ply {ply}: {san}")]
    InvalidMove { ply: usize, san: String },
}

/// Convert a SAN mainline into UCI move strings, validating legality along
/// the way. A game move is load-bearing for every later position, so the
/// first bad token is an error rather than a truncation.
pub fn san_to_uci(moves: &[String]) -> Result<Vec<String>, ReplayError> {
    let mut pos = Chess::default();
    let mut out = Vec::with_capacity(moves.len());

    for (ply, san_str) in moves.iter().enumerate() {
        let bad = || ReplayError::InvalidMove {
            ply: ply + 1,
            san: san_str.clone(),
        };
        let san: San = san_str.parse().map_err(|_| bad())?;
        let mv = san.to_move(&pos).map_err(|_| bad())?;
        out.push(mv.to_uci(CastlingMode::Standard).to_string());
        pos.play_unchecked(mv);
    }

    Ok(out)
}
