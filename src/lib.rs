//! # lexirec - adaptive spaced-repetition engine
//!
//! Storage-agnostic core for vocabulary review scheduling:
//!
//! - **Memory model** - continuous strength with personalized exponential
//!   decay, quiz and reading gains, and discrete state derivation
//! - **Priority scorer** - scalar review urgency per word
//! - **Review pipeline** - applies one interaction (read or quiz answer)
//!   to a memory record and reports forgetting transitions
//! - **Recommendation allocator** - quota-balanced, deduplicated batches
//!   over caller-supplied candidate sources
//! - **Decay sweep** - legacy flat nightly decay batch job
//!
//! The engine operates on in-memory records. Persistence, transport, and
//! question rendering belong to the caller; candidate supply reaches the
//! allocator through the [`CandidateSource`] trait.
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use lexirec::{
//!     apply_quiz_event, AlgorithmConfig, CefrLevel, MemoryRecord, WordInfo,
//! };
//!
//! let config = AlgorithmConfig::default();
//! config.validate().unwrap();
//!
//! let word = WordInfo {
//!     id: "apple".to_string(),
//!     complexity_score: 0.3,
//!     part_of_speech: Some("noun".to_string()),
//!     cefr_level: CefrLevel::A1,
//! };
//!
//! let now = Utc::now();
//! let record = MemoryRecord::new(&word.id, now);
//! let outcome = apply_quiz_event(&record, &word, true, 1800, now, &config).unwrap();
//! assert!(outcome.record.memory_strength > 0.0);
//! ```

pub mod answer;
pub mod config;
pub mod error;
pub mod memory;
pub mod priority;
pub mod recommend;
pub mod review;
pub mod sweep;
pub mod types;

pub use answer::QuestionKind;
pub use config::AlgorithmConfig;
pub use error::EngineError;
pub use memory::{compute_decay, determine_state, personalized_decay_rate};
pub use priority::review_priority;
pub use recommend::{
    allocate_recommendations, distribute_counts, CandidateSource, Recommendation,
    RecommendationBatch, ReviewCandidate,
};
pub use review::{apply_quiz_event, apply_read_event, QuizOutcome};
pub use sweep::{DecaySweep, SweepStats};
pub use types::{CefrLevel, LearnState, LearningStats, MemoryRecord, WordInfo};
