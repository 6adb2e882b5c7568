//! Engine score normalization.

use shakmaty::Color;

/// Sentinel magnitude for forced-mate scores, independent of mate distance.
pub const MATE_SCORE: i32 = 10_000;

/// An evaluation normalized to White's perspective.
///
/// `cp` maps forced mates to `±MATE_SCORE` so downstream arithmetic is
/// uniform; `mate` keeps the signed distance in moves (positive = White
/// delivers mate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eval {
    pub cp: i32,
    pub mate: Option<i32>,
}

impl Eval {
    /// Normalize a raw engine score (side-to-move perspective) to White's
    /// perspective. A line with neither `cp` nor `mate` is a zero eval.
    pub fn from_engine(cp: Option<i32>, mate: Option<i32>, white_to_move: bool) -> Self {
        if let Some(m) = mate {
            // `mate 0` means the side to move is already checkmated
            let white_mates = (m > 0) == white_to_move;
            let dist = m.abs();
            Eval {
                cp: if white_mates { MATE_SCORE } else { -MATE_SCORE },
                mate: Some(if white_mates { dist } else { -dist }),
            }
        } else {
            let c = cp.unwrap_or(0);
            Eval {
                cp: if white_to_move { c } else { -c },
                mate: None,
            }
        }
    }

    /// Score from the mover's point of view.
    pub fn signed_for(&self, mover: Color) -> i32 {
        match mover {
            Color::White => self.cp,
            Color::Black => -self.cp,
        }
    }

    /// Mate distance from the mover's point of view, if any.
    pub fn mate_for(&self, mover: Color) -> Option<i32> {
        self.mate.map(|m| match mover {
            Color::White => m,
            Color::Black => -m,
        })
    }
}
