//! Nightly flat decay sweep.
//!
//! Legacy batch companion to the continuous model in [`crate::memory`]:
//! applies a fixed per-state daily reduction to every record, independent
//! of elapsed time. The continuous model alone is sufficient for
//! scheduling; callers that do not run a nightly job can ignore this
//! module entirely. When used, runs must not overlap (a double run
//! double-applies the reduction), which the handle enforces in-process.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AlgorithmConfig;
use crate::memory::determine_state;
use crate::types::{LearnState, MemoryRecord};

/// Daily reduction per state. New and forgotten words have nothing left
/// to lose; stability grows with mastery.
const DAILY_DECAY_LEARNING: f64 = 0.15;
const DAILY_DECAY_FAMILIAR: f64 = 0.08;
const DAILY_DECAY_MASTERED: f64 = 0.03;
/// Changes below this are dropped to avoid churn on near-identical values.
const MIN_STRENGTH_DELTA: f64 = 1e-4;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepStats {
    pub scanned: usize,
    pub updated: usize,
    pub state_changes: usize,
}

/// Sweep handle guarding against overlapping runs.
#[derive(Debug, Default)]
pub struct DecaySweep {
    running: AtomicBool,
}

impl DecaySweep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the flat decay to every record in place. Per-record updates
    /// run in parallel. Returns `None` when a run is already in flight.
    pub fn run(
        &self,
        records: &mut [MemoryRecord],
        now: DateTime<Utc>,
        config: &AlgorithmConfig,
    ) -> Option<SweepStats> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("decay sweep already running, skipping");
            return None;
        }

        let stats = records
            .par_iter_mut()
            .map(|record| {
                let (updated, state_changed) = decay_record(record, now, config);
                SweepStats {
                    scanned: 1,
                    updated: updated as usize,
                    state_changes: state_changed as usize,
                }
            })
            .reduce(SweepStats::default, |a, b| SweepStats {
                scanned: a.scanned + b.scanned,
                updated: a.updated + b.updated,
                state_changes: a.state_changes + b.state_changes,
            });

        self.running.store(false, Ordering::SeqCst);

        info!(
            scanned = stats.scanned,
            updated = stats.updated,
            state_changes = stats.state_changes,
            "decay sweep completed"
        );

        Some(stats)
    }
}

/// Apply one day of flat decay to a single record. Returns whether the
/// record changed and whether its state label changed.
pub fn decay_record(
    record: &mut MemoryRecord,
    now: DateTime<Utc>,
    config: &AlgorithmConfig,
) -> (bool, bool) {
    let amount = flat_decay_amount(record.state);
    let new_strength = (record.memory_strength - amount).clamp(0.0, 1.0);

    if (new_strength - record.memory_strength).abs() < MIN_STRENGTH_DELTA {
        return (false, false);
    }

    record.memory_strength = new_strength;
    let new_state = determine_state(new_strength, record.has_ever_learned, config);
    let state_changed = new_state != record.state;
    record.state = new_state;
    record.last_review_time = now;

    (true, state_changed)
}

fn flat_decay_amount(state: LearnState) -> f64 {
    match state {
        LearnState::Learning => DAILY_DECAY_LEARNING,
        LearnState::Familiar => DAILY_DECAY_FAMILIAR,
        LearnState::Mastered => DAILY_DECAY_MASTERED,
        LearnState::New | LearnState::Forgotten => 0.0,
    }
}
