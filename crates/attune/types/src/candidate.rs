use crate::ids::CandidateId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Neutral learning weight for freshly authored candidates.
const DEFAULT_LEARNING_WEIGHT: f64 = 0.5;

fn default_learning_weight() -> f64 {
    DEFAULT_LEARNING_WEIGHT
}

/// A weighted, selectable item with adaptive state.
///
/// Candidates are authored externally and never deleted by the core. Only
/// `learning_weight` and `fatigue_score` change at runtime, and both go
/// through the clamping setters below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    /// State tag this candidate applies to; `None` applies to every state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicability_tag: Option<String>,
    /// Pattern vector matched against the user's embedding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Vec<f32>>,
    #[serde(default = "default_learning_weight")]
    learning_weight: f64,
    #[serde(default)]
    fatigue_score: f64,
    /// Opaque outcome payload handed back to the caller on selection.
    #[serde(default)]
    pub payload: Value,
}

impl Candidate {
    pub fn new(id: impl Into<CandidateId>) -> Self {
        Self {
            id: id.into(),
            applicability_tag: None,
            pattern: None,
            learning_weight: DEFAULT_LEARNING_WEIGHT,
            fatigue_score: 0.0,
            payload: Value::Null,
        }
    }

    pub fn with_applicability_tag(mut self, tag: impl Into<String>) -> Self {
        self.applicability_tag = Some(tag.into());
        self
    }

    pub fn with_pattern(mut self, pattern: Vec<f32>) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn with_learning_weight(mut self, weight: f64) -> Self {
        self.set_learning_weight(weight);
        self
    }

    pub fn with_fatigue_score(mut self, fatigue: f64) -> Self {
        self.set_fatigue_score(fatigue);
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn learning_weight(&self) -> f64 {
        self.learning_weight
    }

    pub fn fatigue_score(&self) -> f64 {
        self.fatigue_score
    }

    /// Set the learning weight, clamped to [0, 1]. Non-finite values are ignored.
    pub fn set_learning_weight(&mut self, weight: f64) {
        if weight.is_finite() {
            self.learning_weight = weight.clamp(0.0, 1.0);
        }
    }

    /// Set the fatigue score, floored at 0. Non-finite values are ignored.
    pub fn set_fatigue_score(&mut self, fatigue: f64) {
        if fatigue.is_finite() {
            self.fatigue_score = fatigue.max(0.0);
        }
    }

    /// Bump fatigue after this candidate was selected.
    pub fn record_selection(&mut self) {
        self.fatigue_score += 1.0;
    }

    /// Whether this candidate passes the state filter for `state_tag`.
    ///
    /// Untagged candidates apply everywhere; tagged ones require an exact match.
    pub fn applies_to(&self, state_tag: Option<&str>) -> bool {
        match self.applicability_tag.as_deref() {
            None => true,
            Some(tag) => state_tag == Some(tag),
        }
    }

    /// Re-apply the range invariants, e.g. after deserializing untrusted input.
    pub fn normalized(mut self) -> Self {
        let weight = if self.learning_weight.is_finite() {
            self.learning_weight
        } else {
            DEFAULT_LEARNING_WEIGHT
        };
        self.learning_weight = weight.clamp(0.0, 1.0);
        self.fatigue_score = if self.fatigue_score.is_finite() {
            self.fatigue_score.max(0.0)
        } else {
            0.0
        };
        self
    }
}

/// A candidate together with its optimistic-concurrency version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VersionedCandidate {
    pub candidate: Candidate,
    pub version: u64,
}
