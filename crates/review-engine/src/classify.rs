//! Move-quality classification: the evaluation-loss staircase plus the
//! miss and brilliancy overrides.

use serde::{Deserialize, Serialize};
use shakmaty::Color;

use crate::eval::Eval;

/// Score magnitude at which a position counts as decisively winning.
const FORCED_WIN_THRESHOLD: i32 = 500;

/// Evaluation loss that turns a non-best move in a winning position into a miss.
const MISS_CENTIPAWN_LOSS: i32 = 300;

/// Mate-in-N horizon for the miss rule.
const MISS_MATE_THRESHOLD: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Brilliant,
    Great,
    Best,
    Excellent,
    Good,
    Inaccuracy,
    Miss,
    Mistake,
    Blunder,
    Book,
    Forced,
}

impl Classification {
    /// Quality weight in [0, 1] used only by aggregation.
    pub fn weight(self) -> f64 {
        match self {
            Classification::Blunder => 0.0,
            Classification::Mistake => 0.2,
            Classification::Miss => 0.3,
            Classification::Inaccuracy => 0.4,
            Classification::Good => 0.65,
            Classification::Excellent => 0.9,
            Classification::Best
            | Classification::Great
            | Classification::Brilliant
            | Classification::Book
            | Classification::Forced => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Brilliant => "brilliant",
            Classification::Great => "great",
            Classification::Best => "best",
            Classification::Excellent => "excellent",
            Classification::Good => "good",
            Classification::Inaccuracy => "inaccuracy",
            Classification::Miss => "miss",
            Classification::Mistake => "mistake",
            Classification::Blunder => "blunder",
            Classification::Book => "book",
            Classification::Forced => "forced",
        }
    }
}

/// Candidates walked by the evaluation-loss staircase, most demanding first.
const CENTIPAWN_CLASSIFICATIONS: [Classification; 6] = [
    Classification::Best,
    Classification::Excellent,
    Classification::Good,
    Classification::Inaccuracy,
    Classification::Miss,
    Classification::Mistake,
];

/// Maximum tolerated evaluation loss for a candidate label, as a quadratic
/// in the pre-move score magnitude. Lopsided positions tolerate bigger
/// swings; near balance the bands are tight. Blunder is the fallback and
/// has no finite threshold.
fn loss_threshold(classif: Classification, prev_eval: i32) -> f64 {
    let x = prev_eval.abs() as f64;
    let t = match classif {
        Classification::Best => 0.0001 * x * x + 0.0236 * x - 3.7143,
        Classification::Excellent => 0.0002 * x * x + 0.1231 * x + 27.5455,
        Classification::Good => 0.0002 * x * x + 0.2643 * x + 60.5455,
        Classification::Inaccuracy => 0.0002 * x * x + 0.3624 * x + 108.0909,
        Classification::Miss => 0.00025 * x * x + 0.38255 * x + 166.9541,
        Classification::Mistake => 0.0003 * x * x + 0.4027 * x + 225.8182,
        _ => f64::INFINITY,
    };
    t.max(0.0)
}

/// First staircase label whose threshold covers the observed loss.
fn staircase(eval_loss: i32, prev_eval: i32) -> Classification {
    CENTIPAWN_CLASSIFICATIONS
        .iter()
        .copied()
        .find(|&c| eval_loss as f64 <= loss_threshold(c, prev_eval))
        .unwrap_or(Classification::Blunder)
}

/// Whether a decisive advantage was squandered by a non-best move.
fn missed_opportunity(
    pre: Eval,
    post: Eval,
    mover: Color,
    eval_loss: i32,
    played: &str,
    best_pre: Option<&str>,
) -> bool {
    let forced_mate = matches!(
        pre.mate_for(mover),
        Some(m) if (1..=MISS_MATE_THRESHOLD).contains(&m)
    );
    let winning = pre.cp.abs() >= FORCED_WIN_THRESHOLD || forced_mate;
    // No recorded best move means nothing was demonstrably missed
    let not_best = best_pre.map_or(false, |b| b != played);
    let mate_missed = forced_mate && post.mate_for(mover).map_or(true, |m| m <= 0);

    winning && not_best && (eval_loss >= MISS_CENTIPAWN_LOSS || mate_missed)
}

/// Promote a best move that flipped a lost position, judged from the
/// mover's side. The wider swing wins when both bounds are crossed.
fn swing_promotion(pre: Eval, post: Eval, mover: Color) -> Option<Classification> {
    let pre_m = pre.signed_for(mover);
    let post_m = post.signed_for(mover);
    if pre_m < -300 && post_m >= 300 {
        Some(Classification::Brilliant)
    } else if pre_m < -150 && post_m >= 150 {
        Some(Classification::Great)
    } else {
        None
    }
}

/// Classify one played move.
///
/// `pre` and `post` are the evaluations around the move, both from White's
/// perspective; `best_pre` is the engine's top choice before the move, if
/// any was reported.
pub fn classify_move(
    pre: Eval,
    post: Eval,
    mover: Color,
    played: &str,
    best_pre: Option<&str>,
    is_book: bool,
) -> Classification {
    if is_book {
        return Classification::Book;
    }

    let eval_loss = (pre.cp - post.cp).abs();
    let mut classification = staircase(eval_loss, pre.cp);

    if missed_opportunity(pre, post, mover, eval_loss, played, best_pre) {
        classification = Classification::Miss;
    }

    if classification == Classification::Best {
        if let Some(promoted) = swing_promotion(pre, post, mover) {
            classification = promoted;
        }
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cp(v: i32) -> Eval {
        Eval { cp: v, mate: None }
    }

    fn mate(dist: i32) -> Eval {
        Eval {
            cp: if dist > 0 { 10_000 } else { -10_000 },
            mate: Some(dist),
        }
    }

    #[test]
    fn test_thresholds_clamped_and_monotone() {
        for &x in &[0, 50, 150, 400, 1000, 9999] {
            let mut prev = -1.0;
            for c in CENTIPAWN_CLASSIFICATIONS {
                let t = loss_threshold(c, x);
                assert!(t >= 0.0, "negative threshold for {c:?} at {x}");
                assert!(t >= prev, "staircase not monotone for {c:?} at {x}");
                prev = t;
            }
        }
    }

    #[test]
    fn test_zero_loss_is_best() {
        for &x in &[0, -40, 200, -750, 3000] {
            assert_eq!(staircase(0, x), Classification::Best);
        }
    }

    #[test]
    fn test_staircase_bands_near_balance() {
        assert_eq!(staircase(0, 0), Classification::Best);
        assert_eq!(staircase(20, 0), Classification::Excellent);
        assert_eq!(staircase(50, 0), Classification::Good);
        assert_eq!(staircase(100, 0), Classification::Inaccuracy);
        assert_eq!(staircase(150, 0), Classification::Miss);
        assert_eq!(staircase(200, 0), Classification::Mistake);
        assert_eq!(staircase(300, 0), Classification::Blunder);
    }

    #[test]
    fn test_book_short_circuits_everything() {
        let got = classify_move(cp(900), cp(-900), Color::White, "e2e4", Some("d2d4"), true);
        assert_eq!(got, Classification::Book);
    }

    #[test]
    fn test_miss_on_squandered_win() {
        // Clearly winning, best move ignored, 350cp thrown away
        let got = classify_move(cp(600), cp(250), Color::White, "h2h3", Some("e5f7"), false);
        assert_eq!(got, Classification::Miss);
    }

    #[test]
    fn test_miss_on_abandoned_mate() {
        // Mate in 2 traded for a still-winning queen ending
        let got = classify_move(mate(2), cp(850), Color::White, "d1d2", Some("h5f7"), false);
        assert_eq!(got, Classification::Miss);
    }

    #[test]
    fn test_no_miss_without_best_move() {
        let got = classify_move(cp(600), cp(250), Color::White, "h2h3", None, false);
        assert_ne!(got, Classification::Miss);
    }

    #[test]
    fn test_brilliant_promotion_takes_precedence() {
        // -400 to +350 crosses both the 150 and 300 bounds
        assert_eq!(
            swing_promotion(cp(-400), cp(350), Color::White),
            Some(Classification::Brilliant)
        );
    }

    #[test]
    fn test_great_promotion_on_narrow_swing() {
        assert_eq!(
            swing_promotion(cp(-200), cp(200), Color::White),
            Some(Classification::Great)
        );
    }

    #[test]
    fn test_swing_measured_from_mover() {
        // White-perspective +200 to -200 is a comeback for Black
        assert_eq!(
            swing_promotion(cp(200), cp(-200), Color::Black),
            Some(Classification::Great)
        );
        assert_eq!(swing_promotion(cp(200), cp(-200), Color::White), None);
    }

    #[test]
    fn test_weights_bounded() {
        let all = [
            Classification::Brilliant,
            Classification::Great,
            Classification::Best,
            Classification::Excellent,
            Classification::Good,
            Classification::Inaccuracy,
            Classification::Miss,
            Classification::Mistake,
            Classification::Blunder,
            Classification::Book,
            Classification::Forced,
        ];
        for c in all {
            let w = c.weight();
            assert!((0.0..=1.0).contains(&w));
        }
        assert_eq!(Classification::Blunder.weight(), 0.0);
        assert_eq!(Classification::Book.weight(), 1.0);
        assert_eq!(Classification::Forced.weight(), 1.0);
    }
}
