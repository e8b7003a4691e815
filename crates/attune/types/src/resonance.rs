use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// Per-user coherence scalar, always in [0, 1].
///
/// Non-finite inputs collapse to 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct ResonanceState(f64);

impl ResonanceState {
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for ResonanceState {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<ResonanceState> for f64 {
    fn from(state: ResonanceState) -> Self {
        state.0
    }
}

/// Current state of a user as reported by the user state store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub user_id: UserId,
    /// State tag used to filter applicable candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_tag: Option<String>,
    /// Profile or archetype label, compared by the branch divergence metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub resonance: ResonanceState,
}

impl UserState {
    pub fn new(user_id: impl Into<UserId>, resonance: f64) -> Self {
        Self {
            user_id: user_id.into(),
            state_tag: None,
            profile: None,
            resonance: ResonanceState::new(resonance),
        }
    }

    pub fn with_state_tag(mut self, tag: impl Into<String>) -> Self {
        self.state_tag = Some(tag.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}
