//! Review pipeline: applies one interaction to one memory record.
//!
//! Both entry points are pure given the record: the caller loads (or
//! lazily creates) the record, hands it in, and persists whatever comes
//! back. Concurrent interactions on the same record are the caller's
//! problem to serialize; see `MemoryRecord`.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::AlgorithmConfig;
use crate::error::EngineError;
use crate::memory::{
    determine_state, strength_after_quiz, strength_after_reading,
};
use crate::priority::review_priority;
use crate::types::{LearnState, MemoryRecord, WordInfo};

/// Result of one quiz interaction.
#[derive(Debug, Clone)]
pub struct QuizOutcome {
    pub record: MemoryRecord,
    /// True when this answer pushed the word from a learned state to S-1.
    pub forgotten: bool,
}

/// Apply one reading to the record.
///
/// An effective read (at or above the configured minimum duration) of a
/// brand-new word always promotes it to S1 and marks it as learned,
/// overriding the threshold-derived state. Reading statistics accumulate
/// for every read, effective or not.
pub fn apply_read_event(
    record: &MemoryRecord,
    word: &WordInfo,
    duration_seconds: f64,
    now: DateTime<Utc>,
    config: &AlgorithmConfig,
) -> Result<MemoryRecord, EngineError> {
    check_record(record)?;
    let new_strength = strength_after_reading(record, word, duration_seconds, now, config)?;
    let mut record = record.clone();

    let state_before = record.state;
    let effective = duration_seconds >= config.min_effective_reading_seconds;
    let mut new_state = determine_state(new_strength, record.has_ever_learned, config);

    if state_before == LearnState::New && effective {
        // Seeding: one real read always lifts a new word out of S0.
        new_state = LearnState::Learning;
        mark_first_learn(&mut record, now);
    }

    record.memory_strength = new_strength;
    record.state = new_state;
    record.last_review_time = now;
    record.last_read_time = Some(now);

    record.read_count += 1;
    record.total_read_duration += duration_seconds;
    record.avg_read_duration = record.total_read_duration / record.read_count as f64;

    record.next_review_priority = review_priority(&record, word, now, config);

    if state_before != new_state {
        debug!(
            word_id = %record.word_id,
            from = state_before.as_str(),
            to = new_state.as_str(),
            strength = record.memory_strength,
            "state transition on read"
        );
    }

    Ok(record)
}

/// Apply one quiz answer to the record.
///
/// The reward is keyed to the state the word was in before the answer. A
/// quiz against a never-read word is tolerated; it earns its state's
/// reward and marks the word as learned.
pub fn apply_quiz_event(
    record: &MemoryRecord,
    word: &WordInfo,
    is_correct: bool,
    response_time_ms: i64,
    now: DateTime<Utc>,
    config: &AlgorithmConfig,
) -> Result<QuizOutcome, EngineError> {
    check_record(record)?;
    let new_strength =
        strength_after_quiz(record, word, is_correct, response_time_ms, now, config)?;
    let mut record = record.clone();

    let state_before = record.state;
    let ever_learned_before = record.has_ever_learned;
    // Answering counts as learning, so the zero-strength branch is S-1.
    let new_state = determine_state(new_strength, true, config);

    // Forgotten means a real loss: the word was in a learned state and
    // this answer drove it to S-1. Dropping out of S0 does not count.
    let forgotten = new_state == LearnState::Forgotten
        && state_before != LearnState::Forgotten
        && state_before != LearnState::New
        && ever_learned_before;

    record.memory_strength = new_strength;
    record.state = new_state;
    mark_first_learn(&mut record, now);

    record.total_review_count += 1;
    if is_correct {
        record.total_correct += 1;
        record.consecutive_correct += 1;
    } else {
        record.total_incorrect += 1;
        record.consecutive_correct = 0;
    }

    // Incremental mean over quiz interactions.
    let n = record.total_review_count as i64;
    record.average_response_time_ms = Some(match record.average_response_time_ms {
        None => response_time_ms,
        Some(avg) => (avg * (n - 1) + response_time_ms) / n,
    });

    if forgotten {
        record.forgotten_count += 1;
        record.last_forgotten_time = Some(now);
        record.consecutive_correct = 0;
        debug!(
            word_id = %record.word_id,
            forgotten_count = record.forgotten_count,
            "word forgotten"
        );
    }

    record.last_review_time = now;
    record.next_review_priority = review_priority(&record, word, now, config);

    Ok(QuizOutcome { record, forgotten })
}

fn mark_first_learn(record: &mut MemoryRecord, now: DateTime<Utc>) {
    if !record.has_ever_learned {
        record.has_ever_learned = true;
        record.first_learn_time = Some(now);
    }
}

fn check_record(record: &MemoryRecord) -> Result<(), EngineError> {
    if !record.memory_strength.is_finite() {
        return Err(EngineError::InvalidInput(format!(
            "non-finite memory strength for word {}: {}",
            record.word_id, record.memory_strength
        )));
    }
    Ok(())
}
