use crate::error::{FeedbackError, FeedbackResult};
use attune_signals::NormalizerBounds;
use serde::{Deserialize, Serialize};

/// Relative weight of each feedback modality in the composite.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModalityWeights {
    pub self_report: f64,
    pub behavioral: f64,
    pub biometric: f64,
}

impl ModalityWeights {
    pub const fn new(self_report: f64, behavioral: f64, biometric: f64) -> Self {
        Self {
            self_report,
            behavioral,
            biometric,
        }
    }

    pub fn sum(&self) -> f64 {
        self.self_report + self.behavioral + self.biometric
    }
}

/// Per-metric weights of the behavioral sub-score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BehavioralWeights {
    pub completion_rate: f64,
    pub dwell_time: f64,
    pub focus_ratio: f64,
    pub scroll_depth: f64,
    pub revisit_count: f64,
}

impl Default for BehavioralWeights {
    fn default() -> Self {
        Self {
            completion_rate: 0.3,
            dwell_time: 0.25,
            focus_ratio: 0.2,
            scroll_depth: 0.15,
            revisit_count: 0.1,
        }
    }
}

/// Fusion parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Weights when all three modalities are present.
    pub full: ModalityWeights,
    pub no_biometric: ModalityWeights,
    pub no_behavioral: ModalityWeights,
    pub self_only: ModalityWeights,
    pub behavioral_weights: BehavioralWeights,
    /// Dwell time (s) that maps to the top of the dwell contribution.
    pub target_dwell_secs: f64,
    /// Revisit count that maps to the top of the revisit contribution.
    pub target_revisits: f64,
    /// Standard deviation of sub-scores at which agreement reaches 0.
    pub agreement_scale: f64,
    /// Coverage credited to any submission carrying a self-report.
    pub self_report_confidence_floor: f64,
    #[serde(default)]
    pub normalizer: NormalizerBounds,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            full: ModalityWeights::new(0.5, 0.3, 0.2),
            no_biometric: ModalityWeights::new(0.6, 0.4, 0.0),
            no_behavioral: ModalityWeights::new(0.7, 0.0, 0.3),
            self_only: ModalityWeights::new(1.0, 0.0, 0.0),
            behavioral_weights: BehavioralWeights::default(),
            target_dwell_secs: 120.0,
            target_revisits: 3.0,
            agreement_scale: 0.5,
            self_report_confidence_floor: 0.7,
            normalizer: NormalizerBounds::default(),
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> FeedbackResult<()> {
        for (name, w) in [
            ("full", self.full),
            ("no_biometric", self.no_biometric),
            ("no_behavioral", self.no_behavioral),
            ("self_only", self.self_only),
        ] {
            let parts = [w.self_report, w.behavioral, w.biometric];
            if parts.iter().any(|p| !p.is_finite() || *p < 0.0) || w.sum() <= 0.0 {
                return Err(FeedbackError::InvalidConfig(format!(
                    "modality weights `{}` must be non-negative with a positive sum",
                    name
                )));
            }
        }
        if !(self.target_dwell_secs > 0.0 && self.target_revisits > 0.0) {
            return Err(FeedbackError::InvalidConfig(
                "behavioral targets must be positive".into(),
            ));
        }
        if !(self.agreement_scale > 0.0) {
            return Err(FeedbackError::InvalidConfig(
                "agreement_scale must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.self_report_confidence_floor) {
            return Err(FeedbackError::InvalidConfig(
                "self_report_confidence_floor must be in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Weight updater parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Base learning rate η.
    pub base_eta: f64,
    /// CAS attempts before a conflict is surfaced.
    pub max_cas_attempts: usize,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            base_eta: 0.05,
            max_cas_attempts: attune_store::DEFAULT_CAS_ATTEMPTS,
        }
    }
}

impl UpdaterConfig {
    pub fn validate(&self) -> FeedbackResult<()> {
        if !(self.base_eta.is_finite() && self.base_eta >= 0.0 && self.base_eta <= 1.0) {
            return Err(FeedbackError::InvalidConfig(format!(
                "base_eta must be in [0, 1], got {}",
                self.base_eta
            )));
        }
        if self.max_cas_attempts == 0 {
            return Err(FeedbackError::InvalidConfig(
                "max_cas_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
