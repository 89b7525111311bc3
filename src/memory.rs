//! Memory strength model.
//!
//! Continuous exponential forgetting with personalized rate:
//! decayed = M_last * e^(-lambda' * dt), where
//! lambda' = lambda_base * (1 + complexity) * (1 + ln(1 + forgotten_count) * k_forgotten)
//!
//! Interaction gains on top of the decayed strength:
//! - quiz: per-state reward (or a flat penalty) plus a bounded speed reward
//! - reading: base reward scaled by dwell time and diminishing repetition
//!
//! Results are always clamped to [0, 1]. The discrete learning state is a
//! pure function of strength and learning history.

use chrono::{DateTime, Utc};

use crate::config::AlgorithmConfig;
use crate::error::EngineError;
use crate::types::{LearnState, MemoryRecord, WordInfo};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Fractional days between two instants. Clock skew (start after end)
/// clamps to zero instead of going negative.
pub fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    if start > end {
        return 0.0;
    }
    (end - start).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Whole elapsed days, floored. Used for the recency buckets of the
/// forgotten-word bonus.
pub fn whole_days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    if start > end {
        return 0;
    }
    (end - start).num_days()
}

/// Personalized forgetting rate lambda' for one user-word pair.
///
/// Strictly increasing in complexity and forgetting history, never
/// non-positive for a valid config.
pub fn personalized_decay_rate(
    record: &MemoryRecord,
    word: &WordInfo,
    config: &AlgorithmConfig,
) -> f64 {
    let complexity_factor = 1.0 + word.complexity_score;

    let mut forgotten_factor = 1.0;
    if record.forgotten_count > 0 {
        forgotten_factor = 1.0 + (record.forgotten_count as f64).ln_1p() * config.k_forgotten;
    }

    config.lambda_decay * complexity_factor * forgotten_factor
}

/// Strength remaining at `now` after exponential decay since the last
/// review. Pure; does not clamp beyond what decay itself guarantees.
pub fn compute_decay(
    record: &MemoryRecord,
    word: &WordInfo,
    now: DateTime<Utc>,
    config: &AlgorithmConfig,
) -> f64 {
    let delta_t = days_between(record.last_review_time, now);
    let lambda = personalized_decay_rate(record, word, config);
    record.memory_strength * (-lambda * delta_t).exp()
}

/// Gain of one quiz answer, before clamping.
///
/// Correct answers earn the reward of the state the word was in before the
/// answer; incorrect answers take the flat penalty. The speed reward is
/// added either way and stays in [0, gamma_speed].
pub fn feedback_gain(
    state_before: LearnState,
    is_correct: bool,
    response_time_ms: i64,
    config: &AlgorithmConfig,
) -> Result<f64, EngineError> {
    if response_time_ms < 0 {
        return Err(EngineError::InvalidInput(format!(
            "negative response time: {response_time_ms}ms"
        )));
    }

    let mut gain = if is_correct {
        match state_before {
            LearnState::New => config.alpha_reward_s0,
            LearnState::Learning => config.alpha_reward_s1,
            LearnState::Familiar => config.alpha_reward_s2,
            LearnState::Mastered => config.alpha_reward_s3,
            LearnState::Forgotten => config.alpha_reward,
        }
    } else {
        -config.beta_penalty
    };

    let t_max = config.t_max_ms as f64;
    let effective_time = (response_time_ms as f64).min(t_max);
    gain += config.gamma_speed * (1.0 - effective_time / t_max);

    Ok(gain)
}

/// Gain of one reading, before clamping. Readings shorter than the
/// effective minimum earn nothing; past the optimal dwell time the gain
/// stops growing; repeated readings of the same word yield less each time.
pub fn reading_gain(
    duration_seconds: f64,
    read_count: u32,
    config: &AlgorithmConfig,
) -> Result<f64, EngineError> {
    if !duration_seconds.is_finite() || duration_seconds < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "invalid reading duration: {duration_seconds}s"
        )));
    }

    if duration_seconds < config.min_effective_reading_seconds {
        return Ok(0.0);
    }

    let duration_factor = (duration_seconds / config.optimal_reading_seconds).min(1.0);
    let diminishing_factor = 1.0 / (1.0 + (read_count as f64).ln_1p() * config.k_diminishing);

    Ok(config.alpha_reading * duration_factor * diminishing_factor)
}

/// Strength after decay plus one quiz answer, clamped to [0, 1].
pub fn strength_after_quiz(
    record: &MemoryRecord,
    word: &WordInfo,
    is_correct: bool,
    response_time_ms: i64,
    now: DateTime<Utc>,
    config: &AlgorithmConfig,
) -> Result<f64, EngineError> {
    let decayed = compute_decay(record, word, now, config);
    let gain = feedback_gain(record.state, is_correct, response_time_ms, config)?;
    Ok((decayed + gain).clamp(0.0, 1.0))
}

/// Strength after decay plus one reading, clamped to [0, 1]. Uses the
/// pre-event read count in the diminishing term.
pub fn strength_after_reading(
    record: &MemoryRecord,
    word: &WordInfo,
    duration_seconds: f64,
    now: DateTime<Utc>,
    config: &AlgorithmConfig,
) -> Result<f64, EngineError> {
    let decayed = compute_decay(record, word, now, config);
    let gain = reading_gain(duration_seconds, record.read_count, config)?;
    Ok((decayed + gain).clamp(0.0, 1.0))
}

/// Derive the discrete state from strength and learning history.
///
/// Zero strength splits on history: never-learned words are new, anything
/// previously learned is forgotten.
pub fn determine_state(
    strength: f64,
    has_ever_learned: bool,
    config: &AlgorithmConfig,
) -> LearnState {
    let strength = strength.clamp(0.0, 1.0);

    if strength >= config.threshold_s3 {
        LearnState::Mastered
    } else if strength >= config.threshold_s2 {
        LearnState::Familiar
    } else if strength > 0.0 {
        LearnState::Learning
    } else if has_ever_learned {
        LearnState::Forgotten
    } else {
        LearnState::New
    }
}
