use crate::ids::CandidateId;
use serde::{Deserialize, Serialize};

/// Entropy metrics computed over a user's recent selection window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntropyMetrics {
    pub branch_divergence: f64,
    /// Standard deviation of resonance across the window.
    pub ri_variance: f64,
    pub field_fragmentation: f64,
    pub overall_entropy: f64,
    /// Number of selection events the metrics were computed from.
    pub sample_size: usize,
}

/// Stability classification derived from `overall_entropy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityStatus {
    Stable,
    Elevated,
    Critical,
}

impl std::fmt::Display for StabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stable => write!(f, "stable"),
            Self::Elevated => write!(f, "elevated"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// A corrective action issued by a harmonization cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HarmonizationAction {
    /// Recommend grounding content to the user. Log-only.
    GroundingBoost { ri_variance: f64 },
    /// Reset every touched candidate's weight to a fixed value.
    FieldReset {
        reset_to: f64,
        candidates: Vec<CandidateId>,
    },
    /// Recommend re-stating intentions. Log-only.
    IntentionNudge,
    /// Multiplicatively decay touched candidates' weights, with a floor.
    WeightDecay {
        factor: f64,
        floor: f64,
        candidates: Vec<CandidateId>,
    },
}

impl HarmonizationAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GroundingBoost { .. } => "grounding_boost",
            Self::FieldReset { .. } => "field_reset",
            Self::IntentionNudge => "intention_nudge",
            Self::WeightDecay { .. } => "weight_decay",
        }
    }

    /// Whether applying this action mutates candidate weights.
    pub fn mutates_weights(&self) -> bool {
        matches!(self, Self::FieldReset { .. } | Self::WeightDecay { .. })
    }
}
