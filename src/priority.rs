//! Review priority scoring.
//!
//! priority = w1 * (1 - strength) + w2 * e^(lambda' * dt) + forgotten_bonus
//!
//! The urgency term grows without bound so long-overdue words eventually
//! dominate. The forgotten bonus applies only to S-1 words and fades with
//! both time since forgetting and repeated relapses.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::config::AlgorithmConfig;
use crate::memory::{days_between, personalized_decay_rate, whole_days_between};
use crate::types::{LearnState, MemoryRecord, WordInfo};

const RECENT_FORGOTTEN_DAYS: i64 = 3;
const MEDIUM_FORGOTTEN_DAYS: i64 = 7;
const MEDIUM_BONUS_FACTOR: f64 = 0.6;
const OLD_BONUS_FACTOR: f64 = 0.3;

/// Urgency score for one word. Non-negative; only relative order matters.
pub fn review_priority(
    record: &MemoryRecord,
    word: &WordInfo,
    now: DateTime<Utc>,
    config: &AlgorithmConfig,
) -> f64 {
    // Weakness: the less is retained, the more review is needed.
    let strength_component = config.w1_strength * (1.0 - record.memory_strength);

    // Urgency: exponential in overdue time, with the same personalized
    // rate as decay so difficult and relapse-prone words are chased harder.
    let delta_t = days_between(record.last_review_time, now);
    let lambda = personalized_decay_rate(record, word, config);
    let urgency_component = config.w2_urgency * (lambda * delta_t).exp();

    let forgotten_bonus = if record.state == LearnState::Forgotten {
        forgotten_bonus(record, now, config)
    } else {
        0.0
    };

    strength_component + urgency_component + forgotten_bonus
}

fn forgotten_bonus(record: &MemoryRecord, now: DateTime<Utc>, config: &AlgorithmConfig) -> f64 {
    let Some(forgotten_at) = record.last_forgotten_time else {
        // An S-1 record should always carry its forgetting timestamp.
        // Recover with a neutral half bonus and flag the anomaly.
        warn!(
            word_id = %record.word_id,
            "forgotten record missing lastForgottenTime, using half bonus"
        );
        return config.k_s1_bonus * 0.5;
    };

    let days_since = whole_days_between(forgotten_at, now);
    let mut bonus = if days_since <= RECENT_FORGOTTEN_DAYS {
        // Fresh lapse: the trace is still warm and cheap to restore.
        config.k_s1_bonus
    } else if days_since <= MEDIUM_FORGOTTEN_DAYS {
        config.k_s1_bonus * MEDIUM_BONUS_FACTOR
    } else {
        // Long gone: effectively a new word again.
        config.k_s1_bonus * OLD_BONUS_FACTOR
    };

    // Repeated relapses lower the expected payoff of another attempt.
    if record.forgotten_count > 1 {
        bonus /= 1.0 + record.forgotten_count as f64 * 0.5;
    }

    bonus
}
