use crate::feedback::FeedbackSignals;
use crate::harmonization::{EntropyMetrics, HarmonizationAction, StabilityStatus};
use crate::ids::{CandidateId, EventId, UserId};
use crate::resonance::ResonanceState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only record of one selection.
///
/// `sequence` is assigned by the event log and orders a single user's stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionEvent {
    pub event_id: EventId,
    pub user_id: UserId,
    pub candidate_id: CandidateId,
    pub resonance: ResonanceState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default)]
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
}

impl SelectionEvent {
    pub fn new(
        user_id: UserId,
        candidate_id: CandidateId,
        resonance: ResonanceState,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: EventId::generate(),
            user_id,
            candidate_id,
            resonance,
            state_tag: None,
            profile: None,
            sequence: 0,
            timestamp,
        }
    }

    pub fn with_state_tag(mut self, tag: Option<String>) -> Self {
        self.state_tag = tag;
        self
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }
}

/// Append-only record of one fused feedback submission and its weight update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub record_id: EventId,
    pub user_id: UserId,
    pub candidate_id: CandidateId,
    pub signals: FeedbackSignals,
    pub fulfillment_score: f64,
    pub confidence: f64,
    /// Weight change actually applied, after clamping.
    pub weight_delta: f64,
    pub new_weight: f64,
    #[serde(default)]
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
}

/// Append-only record of an executed harmonization cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmonizationEvent {
    pub event_id: EventId,
    pub user_id: UserId,
    pub metrics: EntropyMetrics,
    pub status: StabilityStatus,
    pub actions: Vec<HarmonizationAction>,
    /// Whether the cycle bypassed the guard interval.
    pub forced: bool,
    #[serde(default)]
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
}
