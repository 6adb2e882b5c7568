//! Folding per-move classifications into phase ratings and player
//! summaries.

use serde::{Deserialize, Serialize};

use crate::classify::Classification;

/// Mean-weight bands for a phase rating, best first.
const RATING_BANDS: [(Classification, f64); 8] = [
    (Classification::Brilliant, 0.95),
    (Classification::Great, 0.85),
    (Classification::Best, 0.75),
    (Classification::Excellent, 0.65),
    (Classification::Good, 0.5),
    (Classification::Inaccuracy, 0.35),
    (Classification::Miss, 0.25),
    (Classification::Mistake, 0.15),
];

/// Rate a phase from the classifications observed in it. An empty phase is
/// neutral.
pub fn phase_rating(classified: &[Classification]) -> Classification {
    if classified.is_empty() {
        return Classification::Good;
    }

    let total: f64 = classified.iter().map(|c| c.weight()).sum();
    let average = total / classified.len() as f64;

    RATING_BANDS
        .iter()
        .find(|(_, floor)| average >= *floor)
        .map(|(rating, _)| *rating)
        .unwrap_or(Classification::Blunder)
}

/// Per-player classification tally. Every kind is present so the counters
/// always sum to the player's move count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub brilliant: u32,
    pub great: u32,
    pub best: u32,
    pub excellent: u32,
    pub good: u32,
    pub inaccuracy: u32,
    pub miss: u32,
    pub mistake: u32,
    pub blunder: u32,
    pub book: u32,
    pub forced: u32,
}

impl PlayerSummary {
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Brilliant => self.brilliant += 1,
            Classification::Great => self.great += 1,
            Classification::Best => self.best += 1,
            Classification::Excellent => self.excellent += 1,
            Classification::Good => self.good += 1,
            Classification::Inaccuracy => self.inaccuracy += 1,
            Classification::Miss => self.miss += 1,
            Classification::Mistake => self.mistake += 1,
            Classification::Blunder => self.blunder += 1,
            Classification::Book => self.book += 1,
            Classification::Forced => self.forced += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.brilliant
            + self.great
            + self.best
            + self.excellent
            + self.good
            + self.inaccuracy
            + self.miss
            + self.mistake
            + self.blunder
            + self.book
            + self.forced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_phase_is_neutral() {
        assert_eq!(phase_rating(&[]), Classification::Good);
    }

    #[test]
    fn test_all_blunders() {
        let moves = vec![Classification::Blunder; 4];
        assert_eq!(phase_rating(&moves), Classification::Blunder);
    }

    #[test]
    fn test_all_book_rates_top_band() {
        let moves = vec![Classification::Book; 2];
        assert_eq!(phase_rating(&moves), Classification::Brilliant);
    }

    #[test]
    fn test_mixed_phase() {
        // (1.0 + 0.65 + 0.2 + 0.9) / 4 = 0.6875 -> Excellent band
        let moves = vec![
            Classification::Best,
            Classification::Good,
            Classification::Mistake,
            Classification::Excellent,
        ];
        assert_eq!(phase_rating(&moves), Classification::Excellent);
    }

    #[test]
    fn test_tally_totals() {
        let mut summary = PlayerSummary::default();
        let played = [
            Classification::Book,
            Classification::Book,
            Classification::Best,
            Classification::Inaccuracy,
            Classification::Blunder,
        ];
        for c in played {
            summary.record(c);
        }
        assert_eq!(summary.total(), played.len() as u32);
        assert_eq!(summary.book, 2);
        assert_eq!(summary.great, 0);
    }
}
