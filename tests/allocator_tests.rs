//! Integration tests for the recommendation allocator against an
//! in-memory candidate source.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use lexirec::{
    allocate_recommendations, AlgorithmConfig, CandidateSource, CefrLevel, LearnState,
    LearningStats, MemoryRecord, ReviewCandidate, WordInfo,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn word(id: &str, level: CefrLevel) -> WordInfo {
    WordInfo {
        id: id.to_string(),
        complexity_score: 0.5,
        part_of_speech: None,
        cefr_level: level,
    }
}

fn candidate(id: &str, state: LearnState) -> ReviewCandidate {
    let now = fixed_now();
    let mut record = MemoryRecord::new(id, now);
    record.state = state;
    record.has_ever_learned = state != LearnState::New;
    record.memory_strength = match state {
        LearnState::Learning => 0.3,
        LearnState::Familiar => 0.6,
        LearnState::Mastered => 0.9,
        _ => 0.0,
    };
    if state == LearnState::Forgotten {
        record.forgotten_count = 1;
        record.last_forgotten_time = Some(now);
    }
    ReviewCandidate {
        record,
        word: word(id, CefrLevel::B1),
    }
}

#[derive(Default)]
struct InMemorySource {
    by_state: HashMap<LearnState, Vec<ReviewCandidate>>,
    new_by_level: HashMap<CefrLevel, Vec<WordInfo>>,
    fetch_calls: RefCell<usize>,
}

impl InMemorySource {
    fn with_review_pool(mut self, state: LearnState, count: usize, prefix: &str) -> Self {
        let pool = (0..count)
            .map(|i| candidate(&format!("{prefix}{i}"), state))
            .collect();
        self.by_state.insert(state, pool);
        self
    }

    fn with_new_pool(mut self, level: CefrLevel, count: usize, prefix: &str) -> Self {
        let pool = (0..count)
            .map(|i| word(&format!("{prefix}{i}"), level))
            .collect();
        self.new_by_level.insert(level, pool);
        self
    }
}

impl CandidateSource for InMemorySource {
    fn fetch_by_state(&self, state: LearnState, limit: usize) -> Vec<ReviewCandidate> {
        *self.fetch_calls.borrow_mut() += 1;
        self.by_state
            .get(&state)
            .map(|pool| pool.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    fn fetch_new_by_level(&self, level: CefrLevel, limit: usize) -> Vec<WordInfo> {
        *self.fetch_calls.borrow_mut() += 1;
        self.new_by_level
            .get(&level)
            .map(|pool| pool.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    fn fetch_new_random(&self, limit: usize) -> Vec<WordInfo> {
        *self.fetch_calls.borrow_mut() += 1;
        self.new_by_level
            .values()
            .flatten()
            .take(limit)
            .cloned()
            .collect()
    }
}

fn full_source() -> InMemorySource {
    let mut source = InMemorySource::default()
        .with_review_pool(LearnState::Forgotten, 20, "forgot-")
        .with_review_pool(LearnState::Learning, 20, "learn-")
        .with_review_pool(LearnState::Familiar, 20, "fam-")
        .with_review_pool(LearnState::Mastered, 20, "master-");
    for level in CefrLevel::ALL {
        source = source.with_new_pool(level, 10, &format!("new-{}-", level.as_str()));
    }
    source
}

fn advanced_stats() -> LearningStats {
    LearningStats {
        forgotten: 50,
        learning: 200,
        familiar: 150,
        mastered: 100,
        not_started: 500,
    }
}

#[test]
fn beginner_gets_only_new_words() {
    let config = AlgorithmConfig::default();
    let source = full_source();
    let stats = LearningStats {
        learning: 10,
        not_started: 500,
        ..Default::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let batch = allocate_recommendations(12, &stats, &source, fixed_now(), &config, &mut rng);

    assert_eq!(batch.items.len(), 12);
    assert_eq!(batch.deficit, 0);
    assert!(batch.items.iter().all(|r| r.state == LearnState::New));
}

#[test]
fn limit_zero_skips_all_queries() {
    let config = AlgorithmConfig::default();
    let source = full_source();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let batch =
        allocate_recommendations(0, &advanced_stats(), &source, fixed_now(), &config, &mut rng);

    assert!(batch.items.is_empty());
    assert_eq!(batch.deficit, 0);
    assert_eq!(*source.fetch_calls.borrow(), 0);
}

#[test]
fn exact_quota_with_ample_pools() {
    let config = AlgorithmConfig::default();
    let source = full_source();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let batch =
        allocate_recommendations(20, &advanced_stats(), &source, fixed_now(), &config, &mut rng);

    assert_eq!(batch.items.len(), 20);
    assert_eq!(batch.deficit, 0);

    let ids: HashSet<&str> = batch.items.iter().map(|r| r.word.id.as_str()).collect();
    assert_eq!(ids.len(), 20, "all recommended words must be distinct");
}

#[test]
fn balanced_mix_covers_every_state() {
    let config = AlgorithmConfig::default();
    let source = full_source();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    // 500 learned / 500 fresh sits in the balanced band: every state gets
    // a slice of a 20-item batch (8 / 2 / 4 / 4 / 2).
    let batch =
        allocate_recommendations(20, &advanced_stats(), &source, fixed_now(), &config, &mut rng);

    let count_state = |state: LearnState| batch.items.iter().filter(|r| r.state == state).count();
    assert_eq!(count_state(LearnState::New), 8);
    assert_eq!(count_state(LearnState::Forgotten), 2);
    assert_eq!(count_state(LearnState::Learning), 4);
    assert_eq!(count_state(LearnState::Familiar), 4);
    assert_eq!(count_state(LearnState::Mastered), 2);
}

#[test]
fn pure_review_when_new_words_exhausted() {
    let config = AlgorithmConfig::default();
    let source = full_source();
    let stats = LearningStats {
        forgotten: 20,
        learning: 100,
        familiar: 60,
        mastered: 40,
        not_started: 0,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let batch = allocate_recommendations(20, &stats, &source, fixed_now(), &config, &mut rng);

    assert_eq!(batch.items.len(), 20);
    assert!(batch.items.iter().all(|r| r.state != LearnState::New));
}

#[test]
fn deficit_reported_when_sources_run_dry() {
    let config = AlgorithmConfig::default();
    let source = InMemorySource::default()
        .with_new_pool(CefrLevel::A1, 3, "new-")
        .with_review_pool(LearnState::Learning, 2, "learn-");
    let stats = LearningStats {
        learning: 2,
        not_started: 3,
        ..Default::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    let batch = allocate_recommendations(10, &stats, &source, fixed_now(), &config, &mut rng);

    assert_eq!(batch.items.len(), 5);
    assert_eq!(batch.deficit, 5);

    let ids: HashSet<&str> = batch.items.iter().map(|r| r.word.id.as_str()).collect();
    assert_eq!(ids.len(), 5);
}

#[test]
fn duplicate_ids_across_sources_appear_once() {
    let config = AlgorithmConfig::default();
    // The same word shows up both as new and as forgotten.
    let source = InMemorySource::default()
        .with_new_pool(CefrLevel::A1, 5, "shared-")
        .with_review_pool(LearnState::Forgotten, 5, "shared-")
        .with_review_pool(LearnState::Learning, 20, "learn-")
        .with_review_pool(LearnState::Familiar, 20, "fam-")
        .with_review_pool(LearnState::Mastered, 20, "master-");
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let batch =
        allocate_recommendations(20, &advanced_stats(), &source, fixed_now(), &config, &mut rng);

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for rec in &batch.items {
        *counts.entry(rec.word.id.as_str()).or_default() += 1;
    }
    assert!(counts.values().all(|&n| n == 1));
}

#[test]
fn backfill_prefers_new_words() {
    let config = AlgorithmConfig::default();
    // Review quotas cannot be met; plenty of fresh words remain.
    let mut source = InMemorySource::default()
        .with_review_pool(LearnState::Learning, 1, "learn-")
        .with_review_pool(LearnState::Familiar, 1, "fam-");
    for level in CefrLevel::ALL {
        source = source.with_new_pool(level, 20, &format!("new-{}-", level.as_str()));
    }
    // Stats promise more review material than the pools can deliver.
    let stats = LearningStats {
        learning: 30,
        familiar: 30,
        mastered: 0,
        forgotten: 0,
        not_started: 120,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let batch = allocate_recommendations(15, &stats, &source, fixed_now(), &config, &mut rng);

    assert_eq!(batch.items.len(), 15);
    assert_eq!(batch.deficit, 0);
    let new_count = batch
        .items
        .iter()
        .filter(|r| r.state == LearnState::New)
        .count();
    assert!(new_count >= 13);
}

#[test]
fn same_seed_gives_same_batch() {
    let config = AlgorithmConfig::default();
    let source = full_source();

    let run = |seed: u64| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        allocate_recommendations(20, &advanced_stats(), &source, fixed_now(), &config, &mut rng)
            .items
            .iter()
            .map(|r| r.word.id.clone())
            .collect::<Vec<_>>()
    };

    assert_eq!(run(99), run(99));
}
