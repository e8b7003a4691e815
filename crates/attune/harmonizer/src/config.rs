use crate::error::{HarmonizerError, HarmonizerResult};
use attune_types::StabilityStatus;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Upper bound applied to the guard interval (ten years).
const MAX_GUARD_INTERVAL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Weights of the three components of `overall_entropy`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntropyWeights {
    pub branch_divergence: f64,
    pub ri_variance: f64,
    pub field_fragmentation: f64,
}

impl Default for EntropyWeights {
    fn default() -> Self {
        Self {
            branch_divergence: 0.4,
            ri_variance: 0.3,
            field_fragmentation: 0.3,
        }
    }
}

/// Per-metric triggers for individual corrective actions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionThresholds {
    /// Critical: `ri_variance` above this issues a grounding boost.
    pub critical_ri_variance: f64,
    /// Critical: `field_fragmentation` above this resets touched weights.
    pub critical_fragmentation: f64,
    /// Elevated: `branch_divergence` above this decays touched weights.
    pub elevated_divergence: f64,
    /// Elevated: `ri_variance` above this issues a grounding boost.
    pub elevated_ri_variance: f64,
}

impl Default for ActionThresholds {
    fn default() -> Self {
        Self {
            critical_ri_variance: 0.3,
            critical_fragmentation: 0.8,
            elevated_divergence: 0.5,
            elevated_ri_variance: 0.2,
        }
    }
}

/// Configuration of the entropy monitor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmonizerConfig {
    /// Number of most recent selections analyzed per cycle.
    pub window_size: usize,
    /// How many following events each event is compared against.
    pub divergence_neighbors: usize,
    pub weights: EntropyWeights,
    /// `overall_entropy` at or above this is Critical.
    pub critical_threshold: f64,
    /// `overall_entropy` at or above this is Elevated.
    pub elevated_threshold: f64,
    pub actions: ActionThresholds,
    /// Weight written by a field reset.
    pub field_reset_weight: f64,
    pub decay_factor: f64,
    pub decay_floor: f64,
    /// Minimum time between unforced cycles for one user.
    pub guard_interval_secs: u64,
    /// Batch CAS attempts before the cycle fails.
    pub max_cas_attempts: usize,
}

impl Default for HarmonizerConfig {
    fn default() -> Self {
        Self {
            window_size: 50,
            divergence_neighbors: 4,
            weights: EntropyWeights::default(),
            critical_threshold: 0.8,
            elevated_threshold: 0.6,
            actions: ActionThresholds::default(),
            field_reset_weight: 0.5,
            decay_factor: 0.9,
            decay_floor: 0.1,
            guard_interval_secs: 24 * 60 * 60,
            max_cas_attempts: attune_store::DEFAULT_CAS_ATTEMPTS,
        }
    }
}

impl HarmonizerConfig {
    /// Short guard interval so simulations can run several cycles.
    pub fn demo() -> Self {
        Self {
            guard_interval_secs: 60,
            ..Self::default()
        }
    }

    /// Daily cadence with extra CAS headroom for busy candidate pools.
    pub fn production() -> Self {
        Self {
            max_cas_attempts: 5,
            ..Self::default()
        }
    }

    pub fn guard_interval(&self) -> Duration {
        Duration::seconds(self.guard_interval_secs.min(MAX_GUARD_INTERVAL_SECS) as i64)
    }

    /// Map an overall entropy to a stability status.
    pub fn classify(&self, overall_entropy: f64) -> StabilityStatus {
        if overall_entropy >= self.critical_threshold {
            StabilityStatus::Critical
        } else if overall_entropy >= self.elevated_threshold {
            StabilityStatus::Elevated
        } else {
            StabilityStatus::Stable
        }
    }

    pub fn validate(&self) -> HarmonizerResult<()> {
        if self.window_size < 2 {
            return Err(HarmonizerError::InvalidConfig(
                "window_size must be at least 2".into(),
            ));
        }
        if self.divergence_neighbors == 0 {
            return Err(HarmonizerError::InvalidConfig(
                "divergence_neighbors must be at least 1".into(),
            ));
        }
        if self.elevated_threshold > self.critical_threshold {
            return Err(HarmonizerError::InvalidConfig(format!(
                "elevated_threshold {} exceeds critical_threshold {}",
                self.elevated_threshold, self.critical_threshold
            )));
        }
        for (name, value) in [
            ("field_reset_weight", self.field_reset_weight),
            ("decay_factor", self.decay_factor),
            ("decay_floor", self.decay_floor),
        ] {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(HarmonizerError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if self.max_cas_attempts == 0 {
            return Err(HarmonizerError::InvalidConfig(
                "max_cas_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
