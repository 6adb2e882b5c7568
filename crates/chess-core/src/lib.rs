//! Pure chess utilities shared by the review engine: PGN parsing into a
//! game record and SAN replay into coordinate notation.

pub mod game_data;
pub mod pgn;
pub mod replay;

pub use game_data::{GameData, GameMetadata};
