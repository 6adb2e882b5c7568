//! Integration tests: classification behavior through the public API.

use review_engine::classify::{classify_move, Classification};
use review_engine::eval::Eval;
use review_engine::shakmaty::Color;

fn cp(v: i32) -> Eval {
    Eval { cp: v, mate: None }
}

/// Rank in severity order; lower is better.
fn severity(c: Classification) -> usize {
    [
        Classification::Brilliant,
        Classification::Great,
        Classification::Best,
        Classification::Excellent,
        Classification::Good,
        Classification::Inaccuracy,
        Classification::Miss,
        Classification::Mistake,
        Classification::Blunder,
    ]
    .iter()
    .position(|&x| x == c)
    .expect("ranked classification")
}

#[test]
fn zero_loss_is_best_at_any_score() {
    for &pre in &[-900, -500, -150, 0, 60, 480, 2500] {
        let got = classify_move(cp(pre), cp(pre), Color::White, "e2e4", None, false);
        assert_eq!(got, Classification::Best, "preEval {pre}");
    }
}

#[test]
fn growing_loss_never_improves_the_label() {
    for &pre in &[0, 120, 400, 800] {
        let mut worst = 0;
        for loss in (0..=600).step_by(20) {
            let got = classify_move(
                cp(pre),
                cp(pre - loss),
                Color::White,
                "e2e4",
                None,
                false,
            );
            let rank = severity(got);
            assert!(
                rank >= worst,
                "label improved from rank {worst} to {rank} at preEval {pre}, loss {loss}"
            );
            worst = rank;
        }
    }
}

#[test]
fn book_move_ignores_the_evaluation_swing() {
    let got = classify_move(cp(400), cp(-800), Color::White, "e2e4", Some("d2d4"), true);
    assert_eq!(got, Classification::Book);
}

#[test]
fn squandered_win_is_a_miss() {
    // 500+ advantage, engine's choice ignored, 300+ thrown away
    let got = classify_move(cp(640), cp(280), Color::White, "a2a3", Some("d4f6"), false);
    assert_eq!(got, Classification::Miss);
}

#[test]
fn abandoned_mate_is_a_miss() {
    let pre = Eval {
        cp: 10_000,
        mate: Some(2),
    };
    let got = classify_move(pre, cp(700), Color::White, "c1d1", Some("f3f7"), false);
    assert_eq!(got, Classification::Miss);
}

#[test]
fn no_miss_when_engine_reported_no_line() {
    let got = classify_move(cp(640), cp(280), Color::White, "a2a3", None, false);
    assert_ne!(got, Classification::Miss);
}

#[test]
fn balanced_position_collapse_is_a_blunder() {
    let got = classify_move(cp(10), cp(-390), Color::White, "g2g4", None, false);
    assert_eq!(got, Classification::Blunder);
}

#[test]
fn tolerance_grows_with_advantage() {
    // The same 120cp slip reads differently at 0 and at 1200
    let near_balance = classify_move(cp(0), cp(-120), Color::White, "e2e4", None, false);
    let lopsided = classify_move(cp(1200), cp(1080), Color::White, "e2e4", None, false);
    assert!(severity(lopsided) < severity(near_balance));
}
