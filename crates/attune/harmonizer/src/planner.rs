use crate::config::HarmonizerConfig;
use attune_store::CasUpdate;
use attune_types::{
    CandidateId, EntropyMetrics, HarmonizationAction, StabilityStatus, VersionedCandidate,
};
use serde::{Deserialize, Serialize};

/// A weight write planned by a harmonization cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightChange {
    pub candidate_id: CandidateId,
    pub previous_weight: f64,
    pub new_weight: f64,
}

/// Chooses corrective actions and derives the weight writes they imply.
pub struct ActionPlanner {
    config: HarmonizerConfig,
}

impl ActionPlanner {
    pub fn new(config: HarmonizerConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self::new(HarmonizerConfig::default())
    }

    pub fn classify(&self, metrics: &EntropyMetrics) -> StabilityStatus {
        self.config.classify(metrics.overall_entropy)
    }

    /// Actions for a status. `touched` are the distinct candidates in the window.
    pub fn plan(
        &self,
        status: StabilityStatus,
        metrics: &EntropyMetrics,
        touched: &[CandidateId],
    ) -> Vec<HarmonizationAction> {
        let t = &self.config.actions;
        let mut actions = Vec::new();

        match status {
            StabilityStatus::Critical => {
                if metrics.ri_variance > t.critical_ri_variance {
                    actions.push(HarmonizationAction::GroundingBoost {
                        ri_variance: metrics.ri_variance,
                    });
                }
                if metrics.field_fragmentation > t.critical_fragmentation {
                    actions.push(HarmonizationAction::FieldReset {
                        reset_to: self.config.field_reset_weight,
                        candidates: touched.to_vec(),
                    });
                }
                actions.push(HarmonizationAction::IntentionNudge);
            }
            StabilityStatus::Elevated => {
                if metrics.branch_divergence > t.elevated_divergence {
                    actions.push(HarmonizationAction::WeightDecay {
                        factor: self.config.decay_factor,
                        floor: self.config.decay_floor,
                        candidates: touched.to_vec(),
                    });
                }
                if metrics.ri_variance > t.elevated_ri_variance {
                    actions.push(HarmonizationAction::GroundingBoost {
                        ri_variance: metrics.ri_variance,
                    });
                }
            }
            StabilityStatus::Stable => {}
        }

        actions
    }

    /// Weight writes for `actions` against the given current candidate states.
    ///
    /// Candidates whose weight would not change produce no write. The returned
    /// updates carry the versions read, so applying them as one batch fails as
    /// a whole if any candidate moved in the meantime.
    pub fn weight_updates(
        &self,
        actions: &[HarmonizationAction],
        current: &[VersionedCandidate],
    ) -> (Vec<CasUpdate>, Vec<WeightChange>) {
        let mut updates = Vec::new();
        let mut changes = Vec::new();

        for versioned in current {
            let previous = versioned.candidate.learning_weight();
            let id = &versioned.candidate.id;
            let mut weight = previous;

            for action in actions {
                match action {
                    HarmonizationAction::FieldReset {
                        reset_to,
                        candidates,
                    } if candidates.contains(id) => {
                        weight = *reset_to;
                    }
                    HarmonizationAction::WeightDecay {
                        factor,
                        floor,
                        candidates,
                    } if candidates.contains(id) => {
                        weight = decay(weight, *factor, *floor);
                    }
                    _ => {}
                }
            }

            if weight != previous {
                let mut candidate = versioned.candidate.clone();
                candidate.set_learning_weight(weight);
                changes.push(WeightChange {
                    candidate_id: id.clone(),
                    previous_weight: previous,
                    new_weight: candidate.learning_weight(),
                });
                updates.push(CasUpdate {
                    expected_version: versioned.version,
                    candidate,
                });
            }
        }

        (updates, changes)
    }
}

impl Default for ActionPlanner {
    fn default() -> Self {
        Self::with_default_config()
    }
}

/// Multiplicative decay that never crosses `floor`. Weights already at or
/// below the floor are left as they are.
fn decay(weight: f64, factor: f64, floor: f64) -> f64 {
    if weight <= floor {
        weight
    } else {
        (weight * factor).max(floor)
    }
}
