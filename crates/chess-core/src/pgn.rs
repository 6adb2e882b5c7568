//! PGN parsing — lightweight regex-based parser.

use regex::Regex;
use thiserror::Error;

use crate::game_data::{GameData, GameMetadata};

const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Error, Debug)]
pub enum PgnError {
    #[error("no moves found in PGN")]
    NoMoves,

    #[error("non-standard starting position")]
    NonStandardStart,
}

/// Parse a PGN string into a [`GameData`]: headers plus the SAN mainline.
///
/// Games that declare a custom starting position (`SetUp "1"` with a FEN
/// other than the standard one) are rejected; a review replays from the
/// initial position.
pub fn parse_pgn(pgn: &str) -> Result<GameData, PgnError> {
    let header_re = Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#).expect("static regex");

    let mut white = "White".to_string();
    let mut black = "Black".to_string();
    let mut result = "*".to_string();
    let mut date = None;
    let mut time_control = None;
    let mut eco = None;
    let mut event = None;
    let mut link = None;
    let mut setup = None;
    let mut fen = None;

    for cap in header_re.captures_iter(pgn) {
        let key = &cap[1];
        let value = cap[2].to_string();
        match key {
            "White" => white = value,
            "Black" => black = value,
            "Result" => result = value,
            "Date" => date = Some(value),
            "TimeControl" => time_control = Some(value),
            "ECO" => eco = Some(value),
            "Event" => event = Some(value),
            "Link" => link = Some(value),
            "SetUp" => setup = Some(value),
            "FEN" => fen = Some(value),
            _ => {}
        }
    }

    if setup.as_deref() == Some("1") {
        if let Some(ref f) = fen {
            if f != STANDARD_START_FEN {
                return Err(PgnError::NonStandardStart);
            }
        }
    }

    let moves = extract_moves(pgn);
    if moves.is_empty() {
        return Err(PgnError::NoMoves);
    }

    Ok(GameData {
        metadata: GameMetadata {
            white,
            black,
            result,
            date,
            time_control,
            eco,
            event,
            link,
        },
        moves,
        pgn: pgn.to_string(),
    })
}

/// Extract SAN moves from PGN text (after removing headers, comments,
/// variations).
fn extract_moves(pgn: &str) -> Vec<String> {
    let header_re = Regex::new(r"\[[^\]]*\]").expect("static regex");
    let no_headers = header_re.replace_all(pgn, "");

    let comment_re = Regex::new(r"\{[^}]*\}").expect("static regex");
    let no_comments = comment_re.replace_all(&no_headers, "");

    let variation_re = Regex::new(r"\([^)]*\)").expect("static regex");
    let no_variations = variation_re.replace_all(&no_comments, "");

    let move_re =
        Regex::new(r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O|O-O")
            .expect("static regex");

    move_re
        .find_iter(&no_variations)
        .map(|m| m.as_str().to_string())
        .collect()
}
