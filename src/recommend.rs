//! Recommendation allocation.
//!
//! Turns per-state inventory counts and a candidate supply into a bounded,
//! deduplicated, state-tagged batch: pick a stage mix from learning
//! progress, apportion integer quotas (largest remainder), split the
//! new-word quota across proficiency tiers, select review candidates with
//! a light urgency bias, then dedupe, backfill, and shuffle.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AlgorithmConfig;
use crate::priority::review_priority;
use crate::types::{CefrLevel, LearnState, LearningStats, MemoryRecord, WordInfo};

/// Below this many ever-learned words the mix is 100% new.
const BEGINNER_TOTAL_LEARNED: u64 = 50;
/// Logistic progress curve for the tier split.
const PROGRESS_MIDPOINT: f64 = 750.0;
const PROGRESS_SLOPE: f64 = 0.02;
/// Review-state fetches over-sample so the urgency bias has room to pick.
const MIN_REVIEW_FETCH: usize = 10;
/// Share of top-priority candidates kept before the variety shuffle.
const TOP_PRIORITY_SHARE: f64 = 0.6;

/// One review-state candidate: the record plus its word metadata.
#[derive(Debug, Clone)]
pub struct ReviewCandidate {
    pub record: MemoryRecord,
    pub word: WordInfo,
}

/// Caller-supplied candidate supply. All methods are read-only fetches;
/// results need no particular order and may exceed or undershoot `limit`
/// freely (the allocator over-fetches and deduplicates).
pub trait CandidateSource {
    /// Up to `limit` candidates currently in `state`.
    fn fetch_by_state(&self, state: LearnState, limit: usize) -> Vec<ReviewCandidate>;
    /// Up to `limit` never-started words of one proficiency tier.
    fn fetch_new_by_level(&self, level: CefrLevel, limit: usize) -> Vec<WordInfo>;
    /// Up to `limit` never-started words of any tier.
    fn fetch_new_random(&self, limit: usize) -> Vec<WordInfo>;
}

/// One recommended word with the state it was drawn from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub word: WordInfo,
    pub state: LearnState,
}

/// Final batch. `deficit` is how far short of the requested limit the
/// batch fell after every fallback source was exhausted; a short batch is
/// a valid degraded result, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBatch {
    pub items: Vec<Recommendation>,
    pub deficit: usize,
}

/// Assemble a batch of exactly `limit` distinct words where the supply
/// allows. `limit == 0` returns an empty batch without touching the source.
pub fn allocate_recommendations<S, R>(
    limit: usize,
    stats: &LearningStats,
    source: &S,
    now: DateTime<Utc>,
    config: &AlgorithmConfig,
    rng: &mut R,
) -> RecommendationBatch
where
    S: CandidateSource,
    R: Rng,
{
    if limit == 0 {
        return RecommendationBatch {
            items: Vec::new(),
            deficit: 0,
        };
    }

    let ratios = stage_ratios(stats);
    let quotas = distribute_counts(limit, &ratios);
    debug!(
        limit,
        total_learned = stats.total_learned(),
        not_started = stats.not_started,
        ?quotas,
        "stage quotas"
    );

    let quota_for = |state: LearnState| -> usize {
        quotas
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    };

    let mut picked: Vec<Recommendation> = Vec::with_capacity(limit);

    // New words, split across tiers by learning progress.
    let new_quota = quota_for(LearnState::New);
    if new_quota > 0 {
        let tier_quotas = distribute_counts(new_quota, &level_ratios(stats.total_learned()));
        for (level, take) in tier_quotas {
            if take == 0 {
                continue;
            }
            for word in source.fetch_new_by_level(level, take) {
                picked.push(Recommendation {
                    word,
                    state: LearnState::New,
                });
            }
        }
    }

    // Review states with a light urgency bias.
    for state in [
        LearnState::Forgotten,
        LearnState::Learning,
        LearnState::Familiar,
    ] {
        let quota = quota_for(state);
        if quota == 0 {
            continue;
        }
        let fetched = source.fetch_by_state(state, (quota * 2).max(MIN_REVIEW_FETCH));
        for candidate in select_with_priority(fetched, quota, now, config, rng) {
            picked.push(Recommendation {
                word: candidate.word,
                state,
            });
        }
    }

    // Mastered words need no urgency ordering: uniform sample.
    let mastered_quota = quota_for(LearnState::Mastered);
    if mastered_quota > 0 {
        let mut fetched =
            source.fetch_by_state(LearnState::Mastered, (mastered_quota * 2).max(MIN_REVIEW_FETCH));
        fetched.shuffle(rng);
        fetched.truncate(mastered_quota);
        for candidate in fetched {
            picked.push(Recommendation {
                word: candidate.word,
                state: LearnState::Mastered,
            });
        }
    }

    // Dedupe by word id, first occurrence wins (its state tag travels).
    let mut seen: HashSet<String> = HashSet::with_capacity(picked.len());
    let mut items: Vec<Recommendation> = Vec::with_capacity(picked.len());
    for rec in picked {
        if seen.insert(rec.word.id.clone()) {
            items.push(rec);
        }
    }

    // Backfill any shortfall in fixed priority order.
    if items.len() < limit {
        warn!(
            got = items.len(),
            need = limit,
            "quota shortfall, backfilling"
        );
        backfill(&mut items, &mut seen, limit, stats, source);
    }

    // Rounding plus backfill overlap can only ever leave us at the limit,
    // but the truncate keeps the contract explicit.
    items.truncate(limit);

    let deficit = limit - items.len();
    if deficit > 0 {
        warn!(deficit, "candidate sources exhausted below limit");
    }

    // Presentation order carries no meaning.
    items.shuffle(rng);

    RecommendationBatch { items, deficit }
}

/// Stage mix by learning progress and remaining new-word supply.
fn stage_ratios(stats: &LearningStats) -> Vec<(LearnState, f64)> {
    use LearnState::*;

    let total_learned = stats.total_learned();

    // Beginners see only new words until they have a review backlog.
    if total_learned < BEGINNER_TOTAL_LEARNED {
        return vec![
            (New, 1.0),
            (Forgotten, 0.0),
            (Learning, 0.0),
            (Familiar, 0.0),
            (Mastered, 0.0),
        ];
    }

    // New words exhausted: pure review, forgotten words first in line.
    if stats.not_started == 0 {
        return vec![
            (New, 0.0),
            (Forgotten, 0.20),
            (Learning, 0.35),
            (Familiar, 0.30),
            (Mastered, 0.15),
        ];
    }

    let available_new_ratio =
        stats.not_started as f64 / (total_learned + stats.not_started) as f64;
    let forgotten_ratio = if stats.forgotten > 0 { 0.05 } else { 0.0 };

    if available_new_ratio > 0.5 {
        // Plenty of new material: exploration first.
        vec![
            (New, 0.60),
            (Forgotten, forgotten_ratio),
            (Learning, 0.15),
            (Familiar, 0.15),
            (Mastered, 0.05),
        ]
    } else if available_new_ratio > 0.2 {
        vec![
            (New, 0.40),
            (Forgotten, forgotten_ratio.max(0.10)),
            (Learning, 0.20),
            (Familiar, 0.20),
            (Mastered, 0.10),
        ]
    } else {
        // New words running out: mostly review, but keep enough
        // exploration that the tail of new words still gets seen.
        let new_share = (available_new_ratio * 1.5).clamp(0.15, 0.30);
        let review_share = 1.0 - new_share - 0.15;
        vec![
            (New, new_share),
            (Forgotten, 0.15),
            (Learning, review_share * 0.45),
            (Familiar, review_share * 0.40),
            (Mastered, review_share * 0.15),
        ]
    }
}

/// Apportion `total` units over a ratio map by largest remainder: floor
/// each exact share, then hand the leftover units to the largest
/// fractional remainders, ties broken by map order. The results always
/// sum to `total` when the ratios have positive mass.
pub fn distribute_counts<K: Copy>(total: usize, ratios: &[(K, f64)]) -> Vec<(K, usize)> {
    if total == 0 || ratios.is_empty() {
        return ratios.iter().map(|&(k, _)| (k, 0)).collect();
    }

    let sum: f64 = ratios.iter().map(|(_, r)| r).sum();
    if sum <= 0.0 {
        return ratios.iter().map(|&(k, _)| (k, 0)).collect();
    }

    let mut counts: Vec<(K, usize)> = Vec::with_capacity(ratios.len());
    let mut remainders: Vec<(usize, f64)> = Vec::with_capacity(ratios.len());
    let mut allocated = 0usize;

    for (index, &(key, ratio)) in ratios.iter().enumerate() {
        let exact = total as f64 * (ratio / sum);
        let base = exact.floor() as usize;
        counts.push((key, base));
        remainders.push((index, exact - base as f64));
        allocated += base;
    }

    // Stable sort keeps map order on equal remainders.
    remainders.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let remaining = total.saturating_sub(allocated);
    for &(index, _) in remainders.iter().take(remaining) {
        counts[index].1 += 1;
    }

    counts
}

/// Tier mix for new words: interpolates from a beginner-weighted to an
/// advanced-weighted distribution as total learned vocabulary grows.
fn level_ratios(total_learned: u64) -> Vec<(CefrLevel, f64)> {
    let progress = sigmoid(total_learned as f64, PROGRESS_MIDPOINT, PROGRESS_SLOPE);
    vec![
        (CefrLevel::A1, 0.30 - 0.20 * progress),
        (CefrLevel::A2, 0.25 - 0.15 * progress),
        (CefrLevel::B1, 0.20 - 0.05 * progress),
        (CefrLevel::B2, 0.15 - 0.05 * progress),
        (CefrLevel::C1, 0.07 + 0.25 * progress),
        (CefrLevel::C2, 0.03 + 0.20 * progress),
    ]
}

fn sigmoid(x: f64, midpoint: f64, slope: f64) -> f64 {
    1.0 / (1.0 + (-slope * (x - midpoint)).exp())
}

/// Score candidates, keep the top share by priority (at least the quota),
/// then shuffle within it and take the quota: urgent words are favored
/// without making the batch deterministic.
fn select_with_priority<R: Rng>(
    candidates: Vec<ReviewCandidate>,
    quota: usize,
    now: DateTime<Utc>,
    config: &AlgorithmConfig,
    rng: &mut R,
) -> Vec<ReviewCandidate> {
    if quota == 0 || candidates.is_empty() {
        return Vec::new();
    }
    if candidates.len() <= quota {
        return candidates;
    }

    let mut scored: Vec<(f64, ReviewCandidate)> = candidates
        .into_iter()
        .map(|c| (review_priority(&c.record, &c.word, now, config), c))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let keep = ((scored.len() as f64 * TOP_PRIORITY_SHARE) as usize)
        .max(quota)
        .min(scored.len());
    let mut pool: Vec<ReviewCandidate> = scored.into_iter().take(keep).map(|(_, c)| c).collect();
    pool.shuffle(rng);
    pool.truncate(quota);
    pool
}

/// Pull extra candidates in fixed order (new, then S-1, S1, S2, S3) until
/// the batch is full or every source runs dry.
fn backfill<S: CandidateSource>(
    items: &mut Vec<Recommendation>,
    seen: &mut HashSet<String>,
    limit: usize,
    stats: &LearningStats,
    source: &S,
) {
    let mut missing = limit - items.len();

    if missing > 0 && stats.not_started > 0 {
        for word in source.fetch_new_random(missing * 2) {
            if seen.insert(word.id.clone()) {
                items.push(Recommendation {
                    word,
                    state: LearnState::New,
                });
                missing -= 1;
                if missing == 0 {
                    break;
                }
            }
        }
    }

    let review_pools = [
        (LearnState::Forgotten, stats.forgotten),
        (LearnState::Learning, stats.learning),
        (LearnState::Familiar, stats.familiar),
        (LearnState::Mastered, stats.mastered),
    ];
    for (state, available) in review_pools {
        if missing == 0 {
            break;
        }
        if available == 0 {
            continue;
        }
        for candidate in source.fetch_by_state(state, missing * 2) {
            if seen.insert(candidate.word.id.clone()) {
                items.push(Recommendation {
                    word: candidate.word,
                    state,
                });
                missing -= 1;
                if missing == 0 {
                    break;
                }
            }
        }
    }
}
