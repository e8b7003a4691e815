use attune_types::SignalKind;
use serde::{Deserialize, Serialize};

/// Physiological bounds used by the normalizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizerBounds {
    /// HRV (ms) mapped to 0.
    pub hrv_min_ms: f64,
    /// HRV (ms) mapped to 1.
    pub hrv_max_ms: f64,
    /// Breaths per minute scored 1.
    pub breath_optimal_bpm: f64,
    /// Deviation from the optimum (bpm) at which the score reaches 0.
    pub breath_tolerance_bpm: f64,
    /// Galvanic response (µS) mapped to 0.
    pub galvanic_max_us: f64,
    /// Motion magnitude mapped to 0.
    pub motion_max: f64,
}

impl Default for NormalizerBounds {
    fn default() -> Self {
        Self {
            hrv_min_ms: 20.0,
            hrv_max_ms: 100.0,
            breath_optimal_bpm: 6.0,
            breath_tolerance_bpm: 10.0,
            galvanic_max_us: 20.0,
            motion_max: 10.0,
        }
    }
}

impl NormalizerBounds {
    /// Normalize a raw value of the given kind to [0, 1].
    ///
    /// Non-finite raw values score 0. Degenerate bounds (zero-width ranges)
    /// fall back to a clamped pass-through.
    pub fn normalize(&self, kind: &SignalKind, raw: f64) -> f64 {
        if !raw.is_finite() {
            return 0.0;
        }
        let score = match kind {
            SignalKind::Hrv => ramp(raw, self.hrv_min_ms, self.hrv_max_ms),
            SignalKind::BreathRate => {
                if self.breath_tolerance_bpm <= 0.0 {
                    raw
                } else {
                    1.0 - (raw - self.breath_optimal_bpm).abs() / self.breath_tolerance_bpm
                }
            }
            SignalKind::Galvanic => 1.0 - ramp(raw, 0.0, self.galvanic_max_us),
            SignalKind::Motion => 1.0 - ramp(raw.abs(), 0.0, self.motion_max),
            SignalKind::Interaction | SignalKind::Other(_) => raw,
        };
        score.clamp(0.0, 1.0)
    }
}

/// Normalize with the default bounds.
pub fn normalize(kind: &SignalKind, raw: f64) -> f64 {
    NormalizerBounds::default().normalize(kind, raw)
}

fn ramp(value: f64, low: f64, high: f64) -> f64 {
    if high <= low {
        return value.clamp(0.0, 1.0);
    }
    ((value - low) / (high - low)).clamp(0.0, 1.0)
}
