//! SM-2 mastery update
//!
//! Variant of the SuperMemo-2 algorithm applied per (trainee, question
//! type, level). The defining property is the three-tier interval
//! progression on the success path: 1 day after the first success, 6 days
//! after the second consecutive success, and ease-factor scaling only from
//! the third onward. A quality below 3 restarts the progression from
//! scratch.

/// Ease factor never drops below this floor
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor assigned to a brand-new record
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Quality at or above which a review counts as a success
pub const PASS_QUALITY: u8 = 3;

/// Scheduling state carried by a review record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sm2State {
    pub ease_factor: f64,
    pub interval_days: i64,
    pub repetitions: i64,
}

impl Sm2State {
    /// State for a record seen for the first time
    pub fn fresh() -> Self {
        Self {
            ease_factor: INITIAL_EASE_FACTOR,
            interval_days: 1,
            repetitions: 0,
        }
    }
}

/// Apply one review with the given quality (clamped to 0-5)
///
/// The ease factor updates on every review, success or failure; only the
/// repetition count and interval take the failure branch.
pub fn review(state: Sm2State, quality: u8) -> Sm2State {
    let q = quality.min(5);
    let miss = f64::from(5 - q);
    let ease_factor =
        (state.ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR);

    if q < PASS_QUALITY {
        // Failure: restart the progression from scratch
        return Sm2State {
            ease_factor,
            interval_days: 1,
            repetitions: 0,
        };
    }

    let repetitions = state.repetitions + 1;
    let interval_days = match repetitions {
        1 => 1,
        2 => 6,
        _ => (state.interval_days as f64 * ease_factor).round() as i64,
    };

    Sm2State {
        ease_factor,
        interval_days,
        repetitions,
    }
}
