use crate::config::UpdaterConfig;
use crate::error::{FeedbackError, FeedbackResult};
use attune_store::{update_candidate, CandidateStore, StorageError};
use attune_types::{CandidateId, VersionedCandidate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One confidence-scaled gradient step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightStep {
    pub previous_weight: f64,
    pub adaptive_eta: f64,
    /// `adaptive_eta × fulfillment`, before clamping.
    pub raw_delta: f64,
    pub new_weight: f64,
}

impl WeightStep {
    /// Change actually applied after clamping to [0, 1].
    pub fn applied_delta(&self) -> f64 {
        self.new_weight - self.previous_weight
    }
}

/// A weight step that has been persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedUpdate {
    pub step: WeightStep,
    pub candidate: VersionedCandidate,
}

/// Applies single-sample stochastic updates to candidate weights.
///
/// No momentum; every call is independent. Persistence goes through a
/// bounded CAS loop so concurrent updates to one candidate compose.
pub struct WeightUpdater {
    config: UpdaterConfig,
}

impl WeightUpdater {
    pub fn new(config: UpdaterConfig) -> FeedbackResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_default_config() -> Self {
        Self {
            config: UpdaterConfig::default(),
        }
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Pure step computation.
    pub fn step(&self, current_weight: f64, fulfillment: f64, confidence: f64) -> WeightStep {
        let confidence = confidence.clamp(0.0, 1.0);
        let fulfillment = fulfillment.clamp(-1.0, 1.0);
        let adaptive_eta = self.config.base_eta * (0.5 + 0.5 * confidence);
        let raw_delta = adaptive_eta * fulfillment;
        WeightStep {
            previous_weight: current_weight,
            adaptive_eta,
            raw_delta,
            new_weight: (current_weight + raw_delta).clamp(0.0, 1.0),
        }
    }

    /// Compute and persist a step against the candidate's latest version.
    pub async fn apply<S>(
        &self,
        store: &S,
        candidate_id: &CandidateId,
        fulfillment: f64,
        confidence: f64,
    ) -> FeedbackResult<AppliedUpdate>
    where
        S: CandidateStore + ?Sized,
    {
        let mut last_step = None;
        let stored = update_candidate(store, candidate_id, self.config.max_cas_attempts, |c| {
            let step = self.step(c.learning_weight(), fulfillment, confidence);
            c.set_learning_weight(step.new_weight);
            last_step = Some(step);
        })
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) => FeedbackError::CandidateNotFound(candidate_id.clone()),
            StorageError::VersionConflict { .. } => {
                warn!(
                    candidate = %candidate_id,
                    attempts = self.config.max_cas_attempts,
                    "weight update exhausted CAS attempts"
                );
                FeedbackError::ConcurrencyConflict {
                    candidate_id: candidate_id.clone(),
                    attempts: self.config.max_cas_attempts,
                }
            }
            other => FeedbackError::Storage(other),
        })?;

        // The closure ran at least once for a successful swap.
        let step = last_step.unwrap_or_else(|| {
            self.step(stored.candidate.learning_weight(), fulfillment, confidence)
        });

        info!(
            candidate = %candidate_id,
            previous = step.previous_weight,
            new_weight = step.new_weight,
            eta = step.adaptive_eta,
            version = stored.version,
            "learning weight updated"
        );

        Ok(AppliedUpdate {
            step,
            candidate: stored,
        })
    }
}

impl Default for WeightUpdater {
    fn default() -> Self {
        Self::with_default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use attune_store::{CasUpdate, InMemoryAttuneStore, StorageResult};
    use attune_types::Candidate;
    use proptest::prelude::*;
    use std::sync::Arc;

    const EPS: f64 = 1e-12;

    #[test]
    fn reference_step() {
        let step = WeightUpdater::default().step(0.6, 1.0, 0.7);
        assert!((step.adaptive_eta - 0.0425).abs() < EPS);
        assert!((step.new_weight - 0.6425).abs() < EPS);
        assert!((step.applied_delta() - 0.0425).abs() < EPS);
    }

    #[test]
    fn zero_confidence_halves_the_rate() {
        let step = WeightUpdater::default().step(0.5, -1.0, 0.0);
        assert!((step.adaptive_eta - 0.025).abs() < EPS);
        assert!((step.new_weight - 0.475).abs() < EPS);
    }

    #[test]
    fn step_clamps_at_bounds() {
        let updater = WeightUpdater::new(UpdaterConfig {
            base_eta: 1.0,
            ..Default::default()
        })
        .unwrap();
        let up = updater.step(0.9, 1.0, 1.0);
        assert_eq!(up.new_weight, 1.0);
        assert!((up.applied_delta() - 0.1).abs() < EPS);
        assert_eq!(updater.step(0.1, -1.0, 1.0).new_weight, 0.0);
    }

    #[tokio::test]
    async fn apply_persists_the_step() {
        let store =
            InMemoryAttuneStore::with_candidates(vec![Candidate::new("a").with_learning_weight(0.6)])
                .unwrap();
        let applied = WeightUpdater::default()
            .apply(&store, &CandidateId::new("a"), 1.0, 0.7)
            .await
            .unwrap();
        assert!((applied.candidate.candidate.learning_weight() - 0.6425).abs() < EPS);
        assert_eq!(applied.candidate.version, 2);
    }

    #[tokio::test]
    async fn apply_on_missing_candidate() {
        let store = InMemoryAttuneStore::new();
        let err = WeightUpdater::default()
            .apply(&store, &CandidateId::new("ghost"), 1.0, 1.0)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::CandidateNotFound(_)));
    }

    /// Store that interleaves one foreign write before the first swap.
    struct RacingOnce {
        inner: InMemoryAttuneStore,
        raced: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl CandidateStore for RacingOnce {
        async fn insert_candidate(&self, c: Candidate) -> StorageResult<VersionedCandidate> {
            self.inner.insert_candidate(c).await
        }
        async fn get_candidate(&self, id: &CandidateId) -> StorageResult<Option<VersionedCandidate>> {
            self.inner.get_candidate(id).await
        }
        async fn list_candidates(&self) -> StorageResult<Vec<VersionedCandidate>> {
            self.inner.list_candidates().await
        }
        async fn compare_and_swap(
            &self,
            expected_version: u64,
            candidate: Candidate,
        ) -> StorageResult<VersionedCandidate> {
            if !self.raced.swap(true, std::sync::atomic::Ordering::SeqCst) {
                // A concurrent writer lowers the weight first.
                let current = self.inner.get_candidate(&candidate.id).await?.unwrap();
                let mut foreign = current.candidate.clone();
                foreign.set_learning_weight(0.2);
                self.inner.compare_and_swap(current.version, foreign).await?;
            }
            self.inner.compare_and_swap(expected_version, candidate).await
        }
        async fn compare_and_swap_many(
            &self,
            updates: Vec<CasUpdate>,
        ) -> StorageResult<Vec<VersionedCandidate>> {
            self.inner.compare_and_swap_many(updates).await
        }
    }

    #[tokio::test]
    async fn apply_recomputes_after_a_lost_race() {
        let store = RacingOnce {
            inner: InMemoryAttuneStore::with_candidates(vec![
                Candidate::new("a").with_learning_weight(0.6)
            ])
            .unwrap(),
            raced: std::sync::atomic::AtomicBool::new(false),
        };
        let applied = WeightUpdater::default()
            .apply(&store, &CandidateId::new("a"), 1.0, 0.7)
            .await
            .unwrap();
        // The step is rebased on the foreign write, not the stale 0.6.
        assert!((applied.step.previous_weight - 0.2).abs() < EPS);
        assert!((applied.candidate.candidate.learning_weight() - 0.2425).abs() < EPS);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_compose() {
        let store = Arc::new(
            InMemoryAttuneStore::with_candidates(vec![Candidate::new("a").with_learning_weight(0.5)])
                .unwrap(),
        );
        let updater = Arc::new(
            WeightUpdater::new(UpdaterConfig {
                base_eta: 0.01,
                max_cas_attempts: 1_000,
            })
            .unwrap(),
        );

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            let updater = updater.clone();
            handles.push(tokio::spawn(async move {
                updater
                    .apply(store.as_ref(), &CandidateId::new("a"), 1.0, 1.0)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let final_weight = store
            .get_candidate(&CandidateId::new("a"))
            .await
            .unwrap()
            .unwrap()
            .candidate
            .learning_weight();
        assert!((final_weight - 0.7).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn step_keeps_weight_in_unit_range(
            w in 0.0f64..=1.0,
            f in -1.0f64..=1.0,
            c in 0.0f64..=1.0,
            eta in 0.0f64..=1.0,
        ) {
            let updater = WeightUpdater::new(UpdaterConfig { base_eta: eta, ..Default::default() }).unwrap();
            let step = updater.step(w, f, c);
            prop_assert!((0.0..=1.0).contains(&step.new_weight));
        }
    }
}
