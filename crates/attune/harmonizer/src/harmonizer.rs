use crate::analyzer::EntropyAnalyzer;
use crate::config::HarmonizerConfig;
use crate::error::{HarmonizerError, HarmonizerResult};
use crate::planner::{ActionPlanner, WeightChange};
use attune_store::AttuneStore;
use attune_types::{
    CandidateId, EntropyMetrics, EventId, HarmonizationAction, HarmonizationEvent,
    StabilityStatus, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Result of an executed cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmonizationReport {
    pub event: HarmonizationEvent,
    pub weight_changes: Vec<WeightChange>,
    /// Whether the event reached the event log.
    pub recorded: bool,
}

impl HarmonizationReport {
    pub fn status(&self) -> StabilityStatus {
        self.event.status
    }

    pub fn metrics(&self) -> &EntropyMetrics {
        &self.event.metrics
    }

    pub fn actions(&self) -> &[HarmonizationAction] {
        &self.event.actions
    }
}

/// Outcome of [`Harmonizer::run_cycle`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HarmonizationOutcome {
    Executed(HarmonizationReport),
    /// The guard interval has not elapsed; nothing was read or written.
    NotDue {
        last_run: DateTime<Utc>,
        next_due: DateTime<Utc>,
    },
}

impl HarmonizationOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed(_))
    }

    pub fn report(&self) -> Option<&HarmonizationReport> {
        match self {
            Self::Executed(report) => Some(report),
            Self::NotDue { .. } => None,
        }
    }
}

/// Entropy monitor for one user at a time.
///
/// A cycle either executes fully, is skipped by the guard, or fails without
/// any weight mutation: all weight writes of a cycle go through one batch CAS.
/// Cycles for the same user are serialized, so the guard check and the
/// recorded event cannot interleave with another cycle for that user.
pub struct Harmonizer {
    config: HarmonizerConfig,
    analyzer: EntropyAnalyzer,
    planner: ActionPlanner,
    cycle_locks: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl Harmonizer {
    pub fn new(config: HarmonizerConfig) -> HarmonizerResult<Self> {
        config.validate()?;
        Ok(Self {
            analyzer: EntropyAnalyzer::new(config.clone()),
            planner: ActionPlanner::new(config.clone()),
            cycle_locks: Mutex::new(HashMap::new()),
            config,
        })
    }

    pub fn with_default_config() -> Self {
        let config = HarmonizerConfig::default();
        Self {
            analyzer: EntropyAnalyzer::new(config.clone()),
            planner: ActionPlanner::new(config.clone()),
            cycle_locks: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &HarmonizerConfig {
        &self.config
    }

    fn cycle_lock(&self, user_id: &UserId) -> Arc<tokio::sync::Mutex<()>> {
        // The map only holds lock handles, so a poisoned guard is still usable.
        let mut locks = self
            .cycle_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(user_id.clone()).or_default().clone()
    }

    /// Run one harmonization cycle for `user_id` at time `now`.
    pub async fn run_cycle<S>(
        &self,
        store: &S,
        user_id: &UserId,
        force: bool,
        now: DateTime<Utc>,
    ) -> HarmonizerResult<HarmonizationOutcome>
    where
        S: AttuneStore + ?Sized,
    {
        let lock = self.cycle_lock(user_id);
        let _cycle = lock.lock().await;

        if !force {
            if let Some(last) = store.last_harmonization(user_id).await? {
                let next_due = last.timestamp + self.config.guard_interval();
                if now <= next_due {
                    debug!(user = %user_id, %next_due, "harmonization not due");
                    return Ok(HarmonizationOutcome::NotDue {
                        last_run: last.timestamp,
                        next_due,
                    });
                }
            }
        }

        let window = store
            .recent_selections(user_id, self.config.window_size)
            .await?;
        let metrics = self.analyzer.analyze(&window);
        let status = self.planner.classify(&metrics);
        let touched = touched_candidates(&window);
        let actions = self.planner.plan(status, &metrics, &touched);

        let weight_changes = if actions.iter().any(|a| a.mutates_weights()) {
            self.apply_weights(store, user_id, &actions, &touched).await?
        } else {
            Vec::new()
        };

        let event = HarmonizationEvent {
            event_id: EventId::generate(),
            user_id: user_id.clone(),
            metrics,
            status,
            actions,
            forced: force,
            sequence: 0,
            timestamp: now,
        };

        let (event, recorded) = match store.append_harmonization(event.clone()).await {
            Ok(stored) => (stored, true),
            Err(e) => {
                warn!(user = %user_id, error = %e, "failed to record harmonization event");
                (event, false)
            }
        };

        info!(
            user = %user_id,
            status = %event.status,
            entropy = event.metrics.overall_entropy,
            actions = event.actions.len(),
            weight_changes = weight_changes.len(),
            forced = force,
            "harmonization cycle executed"
        );

        Ok(HarmonizationOutcome::Executed(HarmonizationReport {
            event,
            weight_changes,
            recorded,
        }))
    }

    /// Plan against fresh reads and apply as one batch, retrying on conflict.
    async fn apply_weights<S>(
        &self,
        store: &S,
        user_id: &UserId,
        actions: &[HarmonizationAction],
        touched: &[CandidateId],
    ) -> HarmonizerResult<Vec<WeightChange>>
    where
        S: AttuneStore + ?Sized,
    {
        for attempt in 1..=self.config.max_cas_attempts {
            let mut current = Vec::with_capacity(touched.len());
            for id in touched {
                match store.get_candidate(id).await? {
                    Some(versioned) => current.push(versioned),
                    None => warn!(candidate = %id, "touched candidate missing from store"),
                }
            }

            let (updates, changes) = self.planner.weight_updates(actions, &current);
            if updates.is_empty() {
                return Ok(changes);
            }

            match store.compare_and_swap_many(updates).await {
                Ok(_) => return Ok(changes),
                Err(e) if e.is_version_conflict() => {
                    debug!(user = %user_id, attempt, "harmonization batch lost a race, re-planning");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            user = %user_id,
            attempts = self.config.max_cas_attempts,
            "harmonization batch exhausted CAS attempts"
        );
        Err(HarmonizerError::ConcurrencyConflict {
            user_id: user_id.to_string(),
            attempts: self.config.max_cas_attempts,
        })
    }
}

impl Default for Harmonizer {
    fn default() -> Self {
        Self::with_default_config()
    }
}

/// Distinct candidate ids in the window, in first-seen order.
fn touched_candidates(window: &[attune_types::SelectionEvent]) -> Vec<CandidateId> {
    let mut touched: Vec<CandidateId> = Vec::new();
    for event in window {
        if !touched.contains(&event.candidate_id) {
            touched.push(event.candidate_id.clone());
        }
    }
    touched
}
