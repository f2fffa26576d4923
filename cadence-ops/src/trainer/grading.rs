//! Grading arithmetic
//!
//! Deterministic scoring used when a training session is finalized. The
//! composite weights type accuracy and answer quality at 40% each and
//! naturalness at 20%; all component scores are on a 0-100 scale.

use cadence_common::db::models::LetterGrade;

pub const TYPE_ACCURACY_WEIGHT: f64 = 0.4;
pub const QUALITY_WEIGHT: f64 = 0.4;
pub const NATURALNESS_WEIGHT: f64 = 0.2;

/// Weighted composite of the three component scores (0-100)
pub fn composite_score(type_accuracy: f64, quality: f64, naturalness: f64) -> f64 {
    TYPE_ACCURACY_WEIGHT * type_accuracy
        + QUALITY_WEIGHT * quality
        + NATURALNESS_WEIGHT * naturalness
}

/// Letter grade for a composite score
pub fn letter_for_score(score: f64) -> LetterGrade {
    if score >= 90.0 {
        LetterGrade::S
    } else if score >= 80.0 {
        LetterGrade::A
    } else if score >= 70.0 {
        LetterGrade::B
    } else if score >= 60.0 {
        LetterGrade::C
    } else {
        LetterGrade::F
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_weighting() {
        assert!((composite_score(100.0, 100.0, 100.0) - 100.0).abs() < 1e-9);
        assert!((composite_score(0.0, 0.0, 0.0)).abs() < 1e-9);
        // 40/40/20 split: naturalness moves the needle half as much
        assert!((composite_score(100.0, 0.0, 0.0) - 40.0).abs() < 1e-9);
        assert!((composite_score(0.0, 0.0, 100.0) - 20.0).abs() < 1e-9);
        assert!((composite_score(90.0, 80.0, 70.0) - 82.0).abs() < 1e-9);
    }

    #[test]
    fn test_letter_boundaries() {
        assert_eq!(letter_for_score(95.0), LetterGrade::S);
        assert_eq!(letter_for_score(90.0), LetterGrade::S);
        assert_eq!(letter_for_score(89.9), LetterGrade::A);
        assert_eq!(letter_for_score(80.0), LetterGrade::A);
        assert_eq!(letter_for_score(75.0), LetterGrade::B);
        assert_eq!(letter_for_score(60.0), LetterGrade::C);
        assert_eq!(letter_for_score(59.9), LetterGrade::F);
        assert_eq!(letter_for_score(0.0), LetterGrade::F);
    }
}
