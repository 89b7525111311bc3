//! Question kinds and answer-correctness policy.
//!
//! Correctness is a policy input to the review pipeline, not part of the
//! memory model: each kind carries its own comparison strategy.

use serde::{Deserialize, Serialize};

/// Strength below which a word gets the easy recognition kind.
const EASY_MAX_STRENGTH: f64 = 0.2;
/// Strength below which a word gets the normal recall kind.
const NORMAL_MAX_STRENGTH: f64 = 0.5;

/// Closed set of quiz kinds.
///
/// `Easy` and `Normal` are option-based (the learner picks a translation),
/// `Hard` is free spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    Easy,
    Normal,
    Hard,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Normal => "NORMAL",
            Self::Hard => "HARD",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "NORMAL" => Self::Normal,
            "HARD" => Self::Hard,
            _ => Self::Easy,
        }
    }

    /// Pick the kind from current memory strength: shaky words get
    /// recognition, familiar words get spelling.
    pub fn for_strength(strength: f64) -> Self {
        if strength <= EASY_MAX_STRENGTH {
            Self::Easy
        } else if strength <= NORMAL_MAX_STRENGTH {
            Self::Normal
        } else {
            Self::Hard
        }
    }

    /// Judge a submitted answer against the canonical expected text.
    ///
    /// Option-based kinds compare the trimmed text exactly; spelling is
    /// forgiving about case.
    pub fn is_answer_correct(&self, expected: &str, submitted: &str) -> bool {
        match self {
            Self::Easy | Self::Normal => submitted.trim() == expected.trim(),
            Self::Hard => submitted.trim().to_lowercase() == expected.trim().to_lowercase(),
        }
    }
}
