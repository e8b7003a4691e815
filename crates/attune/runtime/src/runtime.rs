use crate::clock::{Clock, SystemClock};
use crate::collaborators::{EmbeddingService, UserStateStore};
use crate::config::AttuneConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::metrics::{MetricsSnapshot, RuntimeMetrics};
use crate::timed::TimedStore;
use attune_feedback::{FeedbackError, FusionEngine, WeightUpdater};
use attune_harmonizer::{HarmonizationOutcome, Harmonizer};
use attune_selection::{ScoringMode, SelectionEngine, SelectionRequest};
use attune_store::{
    update_candidate, AttuneStore, CandidateStore, EventLog, QueryWindow, StorageError,
};
use attune_types::{
    BehavioralMetrics, BiometricSample, Candidate, CandidateId, EventId, FeedbackRecord,
    FeedbackSignals, HarmonizationEvent, ResonanceState, SelectionEvent, UserId,
    VersionedCandidate,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Result of [`AttuneRuntime::select_candidate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionOutcome {
    pub candidate_id: CandidateId,
    pub resonance: ResonanceState,
    pub outcome_payload: Value,
    pub reasoning: String,
    pub event_id: EventId,
    pub mode: ScoringMode,
    pub score: f64,
}

/// Post-selection feedback from a caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    pub user_id: UserId,
    pub candidate_id: CandidateId,
    #[serde(default)]
    pub self_report: Option<f64>,
    #[serde(default)]
    pub behavioral: Option<BehavioralMetrics>,
    #[serde(default)]
    pub biometrics: Vec<BiometricSample>,
}

impl FeedbackSubmission {
    pub fn new(user_id: impl Into<UserId>, candidate_id: impl Into<CandidateId>) -> Self {
        Self {
            user_id: user_id.into(),
            candidate_id: candidate_id.into(),
            self_report: None,
            behavioral: None,
            biometrics: Vec::new(),
        }
    }

    pub fn with_self_report(mut self, value: f64) -> Self {
        self.self_report = Some(value);
        self
    }

    pub fn with_behavioral(mut self, metrics: BehavioralMetrics) -> Self {
        self.behavioral = Some(metrics);
        self
    }

    pub fn with_biometric(mut self, sample: BiometricSample) -> Self {
        self.biometrics.push(sample);
        self
    }

    pub fn signals(&self) -> FeedbackSignals {
        FeedbackSignals {
            self_report: self.self_report,
            behavioral: self.behavioral.clone(),
            biometrics: self.biometrics.clone(),
        }
    }
}

/// Result of [`AttuneRuntime::submit_feedback`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackOutcome {
    pub fulfillment_score: f64,
    pub confidence: f64,
    pub new_weight: f64,
    pub weight_delta: f64,
    pub record_id: EventId,
}

/// Entry point for the adaptive loop.
///
/// Owns the engines and the collaborators; every store call is bounded by
/// `io_timeout_ms`. Safe to share across tasks behind an `Arc`.
pub struct AttuneRuntime {
    config: AttuneConfig,
    store: TimedStore,
    user_states: Arc<dyn UserStateStore>,
    embedder: Option<Arc<dyn EmbeddingService>>,
    clock: Arc<dyn Clock>,
    selection: SelectionEngine,
    fusion: FusionEngine,
    updater: WeightUpdater,
    harmonizer: Harmonizer,
    rng: Mutex<StdRng>,
    metrics: RuntimeMetrics,
}

impl AttuneRuntime {
    pub fn new(
        config: AttuneConfig,
        store: Arc<dyn AttuneStore>,
        user_states: Arc<dyn UserStateStore>,
    ) -> RuntimeResult<Self> {
        config.validate()?;

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            store: TimedStore::new(store, Duration::from_millis(config.io_timeout_ms)),
            user_states,
            embedder: None,
            clock: Arc::new(SystemClock),
            selection: SelectionEngine::new(config.selection.clone())?,
            fusion: FusionEngine::new(config.fusion.clone())?,
            updater: WeightUpdater::new(config.updater.clone())?,
            harmonizer: Harmonizer::new(config.harmonizer.clone())?,
            rng: Mutex::new(rng),
            metrics: RuntimeMetrics::new(),
            config,
        })
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingService>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &AttuneConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.config.io_timeout_ms)
    }

    async fn bounded<T, F>(&self, what: &str, fut: F) -> RuntimeResult<T>
    where
        F: Future<Output = RuntimeResult<T>>,
    {
        match tokio::time::timeout(self.io_timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(RuntimeError::Dependency(format!(
                "{} timed out after {}ms",
                what, self.config.io_timeout_ms
            ))),
        }
    }

    /// Embed the text signal, degrading to `None` on any failure.
    async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        let Some(embedder) = self.embedder.as_ref() else {
            debug!("no embedding service configured, scoring without pattern match");
            return None;
        };

        match self.bounded("embedding", embedder.embed(text)).await {
            Ok(vector) if !vector.is_empty() => Some(vector),
            Ok(_) => {
                warn!("embedding service returned an empty vector, scoring without pattern match");
                self.metrics.record_degraded_embedding();
                None
            }
            Err(e) => {
                warn!(error = %e, "embedding unavailable, scoring without pattern match");
                self.metrics.record_degraded_embedding();
                None
            }
        }
    }

    fn track_conflict(&self, e: &StorageError) {
        if e.is_version_conflict() {
            self.metrics.record_cas_conflict();
        }
    }

    /// Select one candidate for the user and record the selection.
    ///
    /// `intent_tag` overrides the stored state tag for applicability
    /// filtering. `text_signal` is embedded for pattern matching when an
    /// embedding service is configured.
    #[instrument(skip(self, text_signal), fields(user = %user_id))]
    pub async fn select_candidate(
        &self,
        user_id: &UserId,
        intent_tag: Option<&str>,
        text_signal: Option<&str>,
    ) -> RuntimeResult<SelectionOutcome> {
        let state = self
            .bounded("user state", self.user_states.user_state(user_id))
            .await?
            .ok_or_else(|| RuntimeError::NotFound(format!("no state for user {}", user_id)))?;

        let state_tag = intent_tag
            .map(str::to_string)
            .or_else(|| state.state_tag.clone());

        let embedding = match text_signal {
            Some(text) if !text.trim().is_empty() => self.embed(text).await,
            _ => None,
        };

        let pool: Vec<Candidate> = self
            .store
            .list_candidates()
            .await?
            .into_iter()
            .map(|v| v.candidate)
            .collect();

        let request = SelectionRequest {
            resonance: state.resonance,
            state_tag: state_tag.as_deref(),
            embedding: embedding.as_deref(),
        };
        let draw: f64 = self.rng.lock().await.gen();
        let decision = self.selection.select(&request, &pool, draw)?;
        let score = decision.selected_score().map(|s| s.score).unwrap_or_default();

        let stored = update_candidate(
            &self.store,
            &decision.selected,
            self.config.updater.max_cas_attempts,
            |c| c.record_selection(),
        )
        .await
        .map_err(|e| {
            self.track_conflict(&e);
            RuntimeError::from(e)
        })?;

        let event = SelectionEvent::new(
            user_id.clone(),
            decision.selected.clone(),
            state.resonance,
            self.clock.now(),
        )
        .with_state_tag(state_tag)
        .with_profile(state.profile.clone());
        let event_id = event.event_id.clone();

        if let Err(e) = self.store.append_selection(event).await {
            warn!(error = %e, "failed to record selection event");
            self.metrics.record_event_log_failure();
        }
        self.metrics.record_selection();

        info!(
            candidate = %decision.selected,
            mode = %decision.mode,
            score,
            fatigue = stored.candidate.fatigue_score(),
            "candidate selected"
        );

        Ok(SelectionOutcome {
            candidate_id: decision.selected,
            resonance: state.resonance,
            outcome_payload: stored.candidate.payload,
            reasoning: decision.reasoning,
            event_id,
            mode: decision.mode,
            score,
        })
    }

    /// Fuse feedback, update the candidate's weight and record the outcome.
    #[instrument(
        skip(self, submission),
        fields(user = %submission.user_id, candidate = %submission.candidate_id)
    )]
    pub async fn submit_feedback(
        &self,
        submission: FeedbackSubmission,
    ) -> RuntimeResult<FeedbackOutcome> {
        let signals = submission.signals();
        let fused = self.fusion.fuse(&signals)?;

        let applied = self
            .updater
            .apply(
                &self.store,
                &submission.candidate_id,
                fused.fulfillment_score,
                fused.confidence,
            )
            .await
            .map_err(|e| {
                if matches!(e, FeedbackError::ConcurrencyConflict { .. }) {
                    self.metrics.record_cas_conflict();
                }
                RuntimeError::from(e)
            })?;

        let new_weight = applied.candidate.candidate.learning_weight();
        let weight_delta = applied.step.applied_delta();
        let record = FeedbackRecord {
            record_id: EventId::generate(),
            user_id: submission.user_id,
            candidate_id: submission.candidate_id,
            signals,
            fulfillment_score: fused.fulfillment_score,
            confidence: fused.confidence,
            weight_delta,
            new_weight,
            sequence: 0,
            timestamp: self.clock.now(),
        };
        let record_id = record.record_id.clone();

        if let Err(e) = self.store.append_feedback(record).await {
            warn!(error = %e, "failed to record feedback");
            self.metrics.record_event_log_failure();
        }
        self.metrics.record_feedback();

        Ok(FeedbackOutcome {
            fulfillment_score: fused.fulfillment_score,
            confidence: fused.confidence,
            new_weight,
            weight_delta,
            record_id,
        })
    }

    /// Run one harmonization cycle for the user, honoring the guard unless
    /// `force` is set.
    #[instrument(skip(self), fields(user = %user_id))]
    pub async fn run_harmonization_cycle(
        &self,
        user_id: &UserId,
        force: bool,
    ) -> RuntimeResult<HarmonizationOutcome> {
        let now = self.clock.now();
        let outcome = self
            .harmonizer
            .run_cycle(&self.store, user_id, force, now)
            .await
            .map_err(|e| {
                if matches!(e, attune_harmonizer::HarmonizerError::ConcurrencyConflict { .. }) {
                    self.metrics.record_cas_conflict();
                }
                RuntimeError::from(e)
            })?;

        self.metrics.record_cycle(outcome.is_executed());
        if let Some(report) = outcome.report() {
            if !report.recorded {
                self.metrics.record_event_log_failure();
            }
        }
        Ok(outcome)
    }

    /// Register a newly authored candidate.
    pub async fn register_candidate(&self, candidate: Candidate) -> RuntimeResult<VersionedCandidate> {
        let stored = self.store.insert_candidate(candidate).await?;
        info!(candidate = %stored.candidate.id, "candidate registered");
        Ok(stored)
    }

    pub async fn candidate(&self, id: &CandidateId) -> RuntimeResult<VersionedCandidate> {
        self.store
            .get_candidate(id)
            .await?
            .ok_or_else(|| RuntimeError::NotFound(format!("candidate {} not found", id)))
    }

    pub async fn candidates(&self) -> RuntimeResult<Vec<VersionedCandidate>> {
        Ok(self.store.list_candidates().await?)
    }

    /// Executed harmonization cycles, newest first.
    pub async fn harmonization_history(
        &self,
        user_id: &UserId,
        window: QueryWindow,
    ) -> RuntimeResult<Vec<HarmonizationEvent>> {
        Ok(self.store.list_harmonizations(user_id, window).await?)
    }

    /// Feedback records, newest first.
    pub async fn feedback_history(
        &self,
        user_id: &UserId,
        window: QueryWindow,
    ) -> RuntimeResult<Vec<FeedbackRecord>> {
        Ok(self.store.list_feedback(user_id, window).await?)
    }

    /// The last `limit` selections, oldest first.
    pub async fn recent_selections(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> RuntimeResult<Vec<SelectionEvent>> {
        Ok(self.store.recent_selections(user_id, limit).await?)
    }
}
