//! Domain models shared by Cadence services
//!
//! Enum fields are stored as TEXT in SQLite; each enum provides
//! `from_str`/`to_db_string` conversions for the database layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a follow-up sequence
///
/// Exactly one state holds at a time. `Won` is terminal: a won sequence is
/// frozen against all further transitions. There is no "lost" state; an
/// abandoned lead is modeled by deleting the sequence record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceStatus {
    /// Waiting out the quiet period before the next outreach cycle
    Cooling,
    /// The 5-step cadence is in progress
    Active,
    /// The lead converted (terminal)
    Won,
}

impl SequenceStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cooling" => Some(SequenceStatus::Cooling),
            "active" => Some(SequenceStatus::Active),
            "won" => Some(SequenceStatus::Won),
            _ => None,
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            SequenceStatus::Cooling => "cooling",
            SequenceStatus::Active => "active",
            SequenceStatus::Won => "won",
        }
    }
}

/// SPIN question-skill category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "S")]
    Situation,
    #[serde(rename = "P")]
    Problem,
    #[serde(rename = "I")]
    Implication,
    #[serde(rename = "N")]
    NeedPayoff,
}

impl QuestionType {
    /// The four canonical skill types, in display order
    pub const ALL: [QuestionType; 4] = [
        QuestionType::Situation,
        QuestionType::Problem,
        QuestionType::Implication,
        QuestionType::NeedPayoff,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "S" => Some(QuestionType::Situation),
            "P" => Some(QuestionType::Problem),
            "I" => Some(QuestionType::Implication),
            "N" => Some(QuestionType::NeedPayoff),
            _ => None,
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            QuestionType::Situation => "S",
            QuestionType::Problem => "P",
            QuestionType::Implication => "I",
            QuestionType::NeedPayoff => "N",
        }
    }
}

/// Letter grade assigned to a trainee answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterGrade {
    S,
    A,
    B,
    C,
    F,
}

impl LetterGrade {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "S" => Some(LetterGrade::S),
            "A" => Some(LetterGrade::A),
            "B" => Some(LetterGrade::B),
            "C" => Some(LetterGrade::C),
            "F" => Some(LetterGrade::F),
            _ => None,
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            LetterGrade::S => "S",
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::F => "F",
        }
    }

    /// SM-2 quality value for this grade (0-5 scale)
    ///
    /// An answer with no gradable content maps to quality 0 (handled by the
    /// caller, since there is no grade at all in that case).
    pub fn quality(&self) -> u8 {
        match self {
            LetterGrade::S => 5,
            LetterGrade::A => 4,
            LetterGrade::B => 3,
            LetterGrade::C => 2,
            LetterGrade::F => 1,
        }
    }
}

/// Training session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Learn,
    Practice,
    LiveSim,
}

impl SessionMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "learn" => Some(SessionMode::Learn),
            "practice" => Some(SessionMode::Practice),
            "live_sim" => Some(SessionMode::LiveSim),
            _ => None,
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            SessionMode::Learn => "learn",
            SessionMode::Practice => "practice",
            SessionMode::LiveSim => "live_sim",
        }
    }
}

/// One follow-up sequence nurturing a warm lead
///
/// Created when a call outcome is marked warm; drives the lead through the
/// 5-step outreach cadence with a 3-month cooldown between cycles until the
/// lead converts or the rep abandons it (record deletion).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpSequence {
    pub guid: Uuid,
    /// Originating call-analysis record (one sequence per call)
    pub call_analysis_guid: Uuid,
    pub contact_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub status: SequenceStatus,
    /// Cadence pass counter, starts at 1 and increments on each cycle close
    pub current_cycle: i64,
    /// Instant at which the next cycle's step 1 becomes due
    pub cooldown_end_date: DateTime<Utc>,
    pub step1_done: bool,
    pub step2_done: bool,
    pub step3_done: bool,
    pub step4_done: bool,
    pub step5_done: bool,
    pub step1_due: Option<DateTime<Utc>>,
    pub step2_due: Option<DateTime<Utc>>,
    pub step3_due: Option<DateTime<Utc>>,
    pub step4_due: Option<DateTime<Utc>>,
    pub step5_due: Option<DateTime<Utc>>,
    /// Drafted email body for step 1 (supplied by the rep or a drafting tool)
    pub step1_content: Option<String>,
    /// Call notes recorded when completing step 4
    pub step4_notes: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter, bumped on every persisted mutation
    pub version: i64,
}

impl FollowUpSequence {
    /// Completion flag for step 1-5
    pub fn step_done(&self, step: u8) -> bool {
        match step {
            1 => self.step1_done,
            2 => self.step2_done,
            3 => self.step3_done,
            4 => self.step4_done,
            5 => self.step5_done,
            _ => false,
        }
    }

    pub fn set_step_done(&mut self, step: u8, done: bool) {
        match step {
            1 => self.step1_done = done,
            2 => self.step2_done = done,
            3 => self.step3_done = done,
            4 => self.step4_done = done,
            5 => self.step5_done = done,
            _ => {}
        }
    }

    /// Due instant for step 1-5
    pub fn step_due(&self, step: u8) -> Option<DateTime<Utc>> {
        match step {
            1 => self.step1_due,
            2 => self.step2_due,
            3 => self.step3_due,
            4 => self.step4_due,
            5 => self.step5_due,
            _ => None,
        }
    }

    pub fn set_step_due(&mut self, step: u8, due: Option<DateTime<Utc>>) {
        match step {
            1 => self.step1_due = due,
            2 => self.step2_due = due,
            3 => self.step3_due = due,
            4 => self.step4_due = due,
            5 => self.step5_due = due,
            _ => {}
        }
    }

    pub fn all_steps_done(&self) -> bool {
        self.step1_done && self.step2_done && self.step3_done && self.step4_done && self.step5_done
    }
}

/// Per-(trainee, question type, level) spaced-repetition mastery record
///
/// Created on the first answered question of a given (type, level) pair and
/// mutated by every subsequent answer. Never deleted: it is the historical
/// mastery record for that skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub guid: Uuid,
    pub trainee_guid: Uuid,
    pub question_type: QuestionType,
    /// Difficulty tier (1-5)
    pub level: i64,
    /// SM-2 difficulty multiplier, floor 1.3, starts at 2.5
    pub ease_factor: f64,
    pub interval_days: i64,
    /// Consecutive successful reviews since the last failure
    pub repetitions: i64,
    pub last_reviewed_at: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
    pub total_attempts: i64,
    pub correct_attempts: i64,
    pub version: i64,
}

/// One practice session for a trainee
///
/// Counters accumulate per submitted response; the aggregate columns are
/// null until the session is explicitly completed, after which the record
/// is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSession {
    pub guid: Uuid,
    pub trainee_guid: Uuid,
    pub mode: SessionMode,
    pub level: i64,
    pub vertical: Option<String>,
    pub timer_seconds: Option<i64>,
    pub questions_answered: i64,
    pub questions_correct: i64,
    /// Running sums for the three component scores (0-100 each)
    pub sum_type_accuracy: f64,
    pub sum_quality: f64,
    pub sum_naturalness: f64,
    pub completed: bool,
    pub avg_type_accuracy: Option<f64>,
    pub avg_quality: Option<f64>,
    pub avg_naturalness: Option<f64>,
    pub overall_score: Option<f64>,
    pub overall_grade: Option<LetterGrade>,
    pub xp_earned: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
