use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Runtime counters. Updated lock-free from concurrent requests.
#[derive(Debug, Default)]
pub struct RuntimeMetrics {
    selections: AtomicU64,
    feedback_submissions: AtomicU64,
    harmonization_cycles: AtomicU64,
    skipped_cycles: AtomicU64,
    cas_conflicts: AtomicU64,
    degraded_embeddings: AtomicU64,
    event_log_failures: AtomicU64,
}

/// Point-in-time copy of [`RuntimeMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub selections: u64,
    pub feedback_submissions: u64,
    pub harmonization_cycles: u64,
    pub skipped_cycles: u64,
    pub cas_conflicts: u64,
    pub degraded_embeddings: u64,
    pub event_log_failures: u64,
}

impl RuntimeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_selection(&self) {
        self.selections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_feedback(&self) {
        self.feedback_submissions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cycle(&self, executed: bool) {
        if executed {
            self.harmonization_cycles.fetch_add(1, Ordering::Relaxed);
        } else {
            self.skipped_cycles.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_cas_conflict(&self) {
        self.cas_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_degraded_embedding(&self) {
        self.degraded_embeddings.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_event_log_failure(&self) {
        self.event_log_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            selections: self.selections.load(Ordering::Relaxed),
            feedback_submissions: self.feedback_submissions.load(Ordering::Relaxed),
            harmonization_cycles: self.harmonization_cycles.load(Ordering::Relaxed),
            skipped_cycles: self.skipped_cycles.load(Ordering::Relaxed),
            cas_conflicts: self.cas_conflicts.load(Ordering::Relaxed),
            degraded_embeddings: self.degraded_embeddings.load(Ordering::Relaxed),
            event_log_failures: self.event_log_failures.load(Ordering::Relaxed),
        }
    }
}
