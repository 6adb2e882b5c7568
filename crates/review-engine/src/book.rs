//! Opening book: a CSV table of opening lines replayed into a
//! position-keyed map. Loaded once, immutable afterwards, shared by
//! reference across concurrent reviews.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use shakmaty::{fen::Fen, san::San, CastlingMode, Chess, EnPassantMode, Position};
use tracing::{debug, warn};

use crate::error::ReviewError;

/// Default maximum full-move number for book lookups.
pub const DEFAULT_BOOK_DEPTH: u32 = 8;

/// Normalized position signature used as a book key: the first four FEN
/// fields (placement, side to move, castling rights, en-passant square),
/// dropping the move counters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey(String);

impl PositionKey {
    pub fn from_position(pos: &Chess) -> Self {
        let fen = Fen::from_position(pos, EnPassantMode::Legal).to_string();
        PositionKey(
            fen.split_whitespace()
                .take(4)
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opening lines keyed by the position before each move, valued with the
/// expected continuation in coordinate notation.
pub struct OpeningBook {
    entries: HashMap<PositionKey, String>,
    max_depth: u32,
}

impl OpeningBook {
    pub fn empty(max_depth: u32) -> Self {
        Self {
            entries: HashMap::new(),
            max_depth,
        }
    }

    /// Load a CSV table of opening lines (columns: code, name, movetext).
    /// Each line is replayed from the initial position; the position before
    /// every move becomes a key for that move. A line is truncated at its
    /// first unparsable or illegal token; the rest of the table still loads.
    pub fn load_csv<P: AsRef<Path>>(path: P, max_depth: u32) -> Result<Self, ReviewError> {
        let file = File::open(path.as_ref()).map_err(|e| {
            ReviewError::BookLoad(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_reader(file, max_depth)
    }

    pub fn from_reader<R: Read>(reader: R, max_depth: u32) -> Result<Self, ReviewError> {
        let mut entries = HashMap::new();
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        for record in csv_reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed book record");
                    continue;
                }
            };
            let Some(movetext) = record.get(2) else {
                continue;
            };
            let name = record.get(1).unwrap_or("");
            index_line(&mut entries, name, movetext);
        }

        debug!(positions = entries.len(), "Opening book indexed");
        Ok(Self { entries, max_depth })
    }

    /// Recorded continuation for a position. Always `None` past the book
    /// depth, regardless of table contents.
    pub fn lookup(&self, key: &PositionKey, fullmove: u32) -> Option<&str> {
        if fullmove > self.max_depth {
            return None;
        }
        self.entries.get(key).map(String::as_str)
    }

    /// Whether the played move matches the book continuation from the
    /// position it was played in.
    pub fn is_book_move(&self, key: &PositionKey, fullmove: u32, played: &str) -> bool {
        self.lookup(key, fullmove) == Some(played)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replay one opening line, recording each position-before-move. Tokens
/// with a dot are move numbers. The first bad token ends the line.
fn index_line(entries: &mut HashMap<PositionKey, String>, name: &str, movetext: &str) {
    let mut pos = Chess::default();

    for token in movetext.split_whitespace() {
        if token.contains('.') {
            continue;
        }
        let Ok(san) = token.parse::<San>() else {
            debug!(line = name, token, "Truncating book line at unparsable token");
            break;
        };
        let Ok(mv) = san.to_move(&pos) else {
            debug!(line = name, token, "Truncating book line at illegal move");
            break;
        };
        entries.insert(
            PositionKey::from_position(&pos),
            mv.to_uci(CastlingMode::Standard).to_string(),
        );
        pos.play_unchecked(mv);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_KEY: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -";

    fn sample_book() -> OpeningBook {
        let csv = "eco,name,moves\n\
                   C20,King's Pawn Game,1. e4 e5\n\
                   D00,Queen's Pawn Game,1. d4 d5\n";
        OpeningBook::from_reader(csv.as_bytes(), DEFAULT_BOOK_DEPTH).unwrap()
    }

    #[test]
    fn test_initial_position_key() {
        let key = PositionKey::from_position(&Chess::default());
        assert_eq!(key.as_str(), START_KEY);
    }

    #[test]
    fn test_lookup_and_book_move() {
        let book = sample_book();
        let key = PositionKey::from_position(&Chess::default());
        assert_eq!(book.lookup(&key, 1), Some("d2d4"));
        assert!(book.is_book_move(&key, 1, "d2d4"));
        assert!(!book.is_book_move(&key, 1, "g1f3"));
    }

    #[test]
    fn test_depth_gate() {
        let book = sample_book();
        let key = PositionKey::from_position(&Chess::default());
        assert_eq!(book.lookup(&key, 8), Some("d2d4"));
        assert_eq!(book.lookup(&key, 9), None);
    }

    #[test]
    fn test_bad_token_truncates_only_its_line() {
        let csv = "eco,name,moves\n\
                   X00,Broken Line,1. e4 Zz9 c5\n\
                   B20,Sicilian Defence,1. e4 c5 2. Nf3\n";
        let book = OpeningBook::from_reader(csv.as_bytes(), DEFAULT_BOOK_DEPTH).unwrap();

        // The broken line indexed only its first move; the Sicilian loaded
        // in full: start, after e4, and after c5.
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn test_short_records_skipped() {
        let csv = "eco,name,moves\nA00\nC20,King's Pawn Game,1. e4 e5\n";
        let book = OpeningBook::from_reader(csv.as_bytes(), DEFAULT_BOOK_DEPTH).unwrap();
        assert_eq!(book.len(), 2);
    }
}
