//! Common types shared across the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Proficiency Tiers ====================

/// CEFR proficiency tier of a word, from beginner (A1) to near-native (C2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    /// All tiers in ascending difficulty order.
    pub const ALL: [CefrLevel; 6] = [
        Self::A1,
        Self::A2,
        Self::B1,
        Self::B2,
        Self::C1,
        Self::C2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "A1" => Some(Self::A1),
            "A2" => Some(Self::A2),
            "B1" => Some(Self::B1),
            "B2" => Some(Self::B2),
            "C1" => Some(Self::C1),
            "C2" => Some(Self::C2),
            _ => None,
        }
    }
}

// ==================== Learning States ====================

/// Discrete learning state derived from memory strength and history.
///
/// Wire labels follow the original state machine: `S0` new, `S1` learning,
/// `S2` familiar, `S3` mastered, `S-1` forgotten. The state is always a
/// function of `memory_strength` and `has_ever_learned`, except for the
/// read-triggered S0 promotion in the review pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LearnState {
    #[serde(rename = "S0")]
    New,
    #[serde(rename = "S1")]
    Learning,
    #[serde(rename = "S2")]
    Familiar,
    #[serde(rename = "S3")]
    Mastered,
    #[serde(rename = "S-1")]
    Forgotten,
}

impl Default for LearnState {
    fn default() -> Self {
        Self::New
    }
}

impl LearnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "S0",
            Self::Learning => "S1",
            Self::Familiar => "S2",
            Self::Mastered => "S3",
            Self::Forgotten => "S-1",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "S1" => Self::Learning,
            "S2" => Self::Familiar,
            "S3" => Self::Mastered,
            "S-1" => Self::Forgotten,
            _ => Self::New,
        }
    }
}

// ==================== Word Metadata ====================

/// Word metadata consumed by the engine. Read-only: the engine never
/// mutates word attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordInfo {
    pub id: String,
    /// Difficulty score, conventionally in [0, 2]. Harder words decay faster.
    pub complexity_score: f64,
    pub part_of_speech: Option<String>,
    pub cefr_level: CefrLevel,
}

// ==================== Memory Record ====================

/// Per user-word memory state owned by the engine.
///
/// Single-writer value type: an interaction reads, transforms, and writes
/// back one record. Concurrent interactions on the same record must be
/// serialized by the caller (row locking or optimistic versioning);
/// accumulators such as `consecutive_correct` do not merge under
/// last-write-wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    pub word_id: String,
    /// Continuous memory estimate in [0.0, 1.0].
    pub memory_strength: f64,
    pub state: LearnState,
    /// Monotonic: flips false to true once, never resets.
    pub has_ever_learned: bool,
    pub last_review_time: DateTime<Utc>,
    pub last_read_time: Option<DateTime<Utc>>,
    pub first_learn_time: Option<DateTime<Utc>>,
    pub last_forgotten_time: Option<DateTime<Utc>>,
    pub read_count: u32,
    pub total_read_duration: f64,
    pub avg_read_duration: f64,
    pub total_correct: u32,
    pub total_incorrect: u32,
    pub consecutive_correct: u32,
    /// Quiz interactions seen so far; denominator of the response-time mean.
    pub total_review_count: u32,
    pub average_response_time_ms: Option<i64>,
    pub forgotten_count: u32,
    /// Last computed urgency score. Cache only, recomputed after each event.
    pub next_review_priority: f64,
}

impl MemoryRecord {
    /// Blank record created lazily on first interaction with a word.
    pub fn new(word_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            word_id: word_id.to_string(),
            memory_strength: 0.0,
            state: LearnState::New,
            has_ever_learned: false,
            last_review_time: now,
            last_read_time: None,
            first_learn_time: None,
            last_forgotten_time: None,
            read_count: 0,
            total_read_duration: 0.0,
            avg_read_duration: 0.0,
            total_correct: 0,
            total_incorrect: 0,
            consecutive_correct: 0,
            total_review_count: 0,
            average_response_time_ms: None,
            forgotten_count: 0,
            next_review_priority: 0.0,
        }
    }

    pub fn is_forgotten(&self) -> bool {
        self.state == LearnState::Forgotten
    }

    /// Quiz accuracy in [0.0, 1.0]; 0.0 before any answer.
    pub fn accuracy_rate(&self) -> f64 {
        let total = self.total_correct + self.total_incorrect;
        if total == 0 {
            return 0.0;
        }
        self.total_correct as f64 / total as f64
    }
}

// ==================== Aggregate Stats ====================

/// Per-state inventory counts for one user, supplied by the caller to the
/// recommendation allocator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    pub forgotten: u64,
    pub learning: u64,
    pub familiar: u64,
    pub mastered: u64,
    /// Words the user has never interacted with.
    pub not_started: u64,
}

impl LearningStats {
    /// Count of words ever touched: everything except the untouched pool.
    pub fn total_learned(&self) -> u64 {
        self.forgotten + self.learning + self.familiar + self.mastered
    }
}

// ==================== Tests ====================
