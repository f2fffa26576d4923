//! Due-item selection and priority ranking
//!
//! Read-time ranking of which (question type, level) pairs a trainee should
//! review next. Two tracks feed the list: records whose next-review instant
//! has passed, with urgency growing linearly in days overdue, and canonical
//! skill types never attempted at the target level, which outrank
//! everything so coverage is front-loaded across all four types before any
//! one is repeated deeply. Ranking never mutates the records.

use cadence_common::db::models::{QuestionType, ReviewRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Priority assigned to a (type, level) pair with no record at all
pub const NEW_PAIR_PRIORITY: i64 = 100;

/// Priority bonus for a due record that has never been attempted
pub const UNSEEN_BONUS: i64 = 50;

/// Priority weight per day overdue
pub const OVERDUE_WEIGHT: i64 = 10;

/// One entry in the ranked review list
#[derive(Debug, Clone, Serialize)]
pub struct RankedItem {
    pub question_type: QuestionType,
    pub level: i64,
    pub priority: i64,
    pub days_overdue: i64,
    /// True for a pair with no record at all (distinct from a record with
    /// zero attempts)
    pub is_new: bool,
    pub total_attempts: i64,
}

/// Count of ranked items per skill type, keyed S/P/I/N on the wire
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeBreakdown {
    #[serde(rename = "S")]
    pub s: i64,
    #[serde(rename = "P")]
    pub p: i64,
    #[serde(rename = "I")]
    pub i: i64,
    #[serde(rename = "N")]
    pub n: i64,
}

impl TypeBreakdown {
    fn bump(&mut self, question_type: QuestionType) {
        match question_type {
            QuestionType::Situation => self.s += 1,
            QuestionType::Problem => self.p += 1,
            QuestionType::Implication => self.i += 1,
            QuestionType::NeedPayoff => self.n += 1,
        }
    }
}

/// Ranked review list for one trainee
#[derive(Debug, Clone, Serialize)]
pub struct DueReviews {
    pub items: Vec<RankedItem>,
    pub total_due: i64,
    pub breakdown: TypeBreakdown,
}

/// Rank due and never-seen items, highest priority first
///
/// `records` must be the trainee's full record set for the queried scope
/// (already level-filtered when `target_level` is given): non-due records
/// take no slot in the list but do mark their (type, level) pair as seen.
/// New-pair detection needs a concrete level, so it only runs when
/// `target_level` is present.
pub fn rank_reviews(
    records: &[ReviewRecord],
    target_level: Option<i64>,
    now: DateTime<Utc>,
) -> DueReviews {
    let mut items: Vec<RankedItem> = Vec::new();

    for record in records {
        if record.next_review_at > now {
            continue;
        }
        let days_overdue = (now - record.next_review_at).num_days().max(0);
        let unseen = if record.total_attempts == 0 {
            UNSEEN_BONUS
        } else {
            0
        };
        items.push(RankedItem {
            question_type: record.question_type,
            level: record.level,
            priority: days_overdue * OVERDUE_WEIGHT + unseen,
            days_overdue,
            is_new: false,
            total_attempts: record.total_attempts,
        });
    }

    if let Some(level) = target_level {
        for question_type in QuestionType::ALL {
            let seen = records
                .iter()
                .any(|r| r.question_type == question_type && r.level == level);
            if !seen {
                items.push(RankedItem {
                    question_type,
                    level,
                    priority: NEW_PAIR_PRIORITY,
                    days_overdue: 0,
                    is_new: true,
                    total_attempts: 0,
                });
            }
        }
    }

    items.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut breakdown = TypeBreakdown::default();
    for item in &items {
        breakdown.bump(item.question_type);
    }

    DueReviews {
        total_due: items.len() as i64,
        breakdown,
        items,
    }
}
