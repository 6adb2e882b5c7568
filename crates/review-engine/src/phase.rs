//! Game-phase detection from material count.

use serde::{Deserialize, Serialize};
use shakmaty::{Board, Role};

/// Material total at or below which the endgame begins.
const ENDGAME_MATERIAL_THRESHOLD: i32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 1,
        Role::Knight => 3,
        Role::Bishop => 3,
        Role::Rook => 5,
        Role::Queen => 9,
        Role::King => 0,
    }
}

/// Classify a position into a phase.
///
/// The opening/non-opening transition is owned by the caller (driven by
/// book-lookup misses); past it, the phase is recomputed from material on
/// every call. Queenless positions count as endgames at twice the usual
/// material bar.
pub fn detect_phase(board: &Board, in_opening: bool) -> GamePhase {
    if in_opening {
        return GamePhase::Opening;
    }

    let mut total_material = 0i32;
    let mut queens = 0;

    for sq in board.occupied() {
        if let Some(piece) = board.piece_at(sq) {
            total_material += piece_value(piece.role);
            if piece.role == Role::Queen {
                queens += 1;
            }
        }
    }

    if total_material <= ENDGAME_MATERIAL_THRESHOLD
        || (queens == 0 && total_material <= ENDGAME_MATERIAL_THRESHOLD * 2)
    {
        GamePhase::Endgame
    } else {
        GamePhase::Middlegame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{fen::Fen, CastlingMode, Chess, Position};

    fn board_from(fen: &str) -> Board {
        let fen: Fen = fen.parse().expect("valid FEN");
        let pos: Chess = fen
            .into_position(CastlingMode::Standard)
            .expect("legal position");
        pos.board().clone()
    }

    #[test]
    fn test_opening_flag_wins() {
        let board = board_from("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(detect_phase(&board, true), GamePhase::Opening);
    }

    #[test]
    fn test_starting_position_is_middlegame_once_out_of_book() {
        let board = Board::default();
        assert_eq!(detect_phase(&board, false), GamePhase::Middlegame);
    }

    #[test]
    fn test_rook_ending() {
        // Two rooks and a handful of pawns: 16 points total
        let board = board_from("4k3/1r3ppp/8/8/8/8/PPP5/3RK3 w - - 0 1");
        assert_eq!(detect_phase(&board, false), GamePhase::Endgame);
    }

    #[test]
    fn test_queenless_threshold_is_doubled() {
        // Full armies minus both queens: 60 points, still above the
        // doubled 48-point bar
        let board = board_from("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1");
        assert_eq!(detect_phase(&board, false), GamePhase::Middlegame);

        // Drop the rooks too: 40 points, queenless endgame
        let board = board_from("1nb1kbn1/pppppppp/8/8/8/8/PPPPPPPP/1NB1KBN1 w - - 0 1");
        assert_eq!(detect_phase(&board, false), GamePhase::Endgame);
    }

    #[test]
    fn test_queens_keep_middlegame_alive() {
        // Queens plus minor pieces on both sides: 30 points, above the
        // 24-point bar and not queenless
        let board = board_from("2bqk3/8/8/8/8/8/8/2BQK1N1 w - - 0 1");
        assert_eq!(detect_phase(&board, false), GamePhase::Middlegame);
    }
}
