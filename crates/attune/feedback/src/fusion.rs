use crate::config::{FusionConfig, ModalityWeights};
use crate::error::{FeedbackError, FeedbackResult};
use attune_types::{BehavioralMetrics, BiometricSample, FeedbackSignals};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which feedback modalities carried usable data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalitySet {
    pub self_report: bool,
    pub behavioral: bool,
    pub biometric: bool,
}

impl ModalitySet {
    pub fn count(&self) -> usize {
        [self.self_report, self.behavioral, self.biometric]
            .iter()
            .filter(|present| **present)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Result of fusing one feedback submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FusionOutcome {
    /// Composite outcome in [-1, 1].
    pub fulfillment_score: f64,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub modalities: ModalitySet,
    /// Base weights chosen for the present modalities.
    pub weights: ModalityWeights,
    pub self_score: Option<f64>,
    pub behavioral_score: Option<f64>,
    pub biometric_score: Option<f64>,
}

impl FusionOutcome {
    fn empty() -> Self {
        Self {
            fulfillment_score: 0.0,
            confidence: 0.0,
            modalities: ModalitySet::default(),
            weights: ModalityWeights::new(0.0, 0.0, 0.0),
            self_score: None,
            behavioral_score: None,
            biometric_score: None,
        }
    }
}

/// Fuses heterogeneous feedback into a single outcome and confidence.
pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> FeedbackResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_default_config() -> Self {
        Self {
            config: FusionConfig::default(),
        }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Reject out-of-range input before anything is computed or stored.
    pub fn validate(&self, signals: &FeedbackSignals) -> FeedbackResult<()> {
        if let Some(value) = signals.self_report {
            if !(value.is_finite() && (-1.0..=1.0).contains(&value)) {
                return Err(FeedbackError::InvalidSelfReport(value));
            }
        }

        if let Some(metrics) = &signals.behavioral {
            for (field, value) in [
                ("completion_rate", metrics.completion_rate),
                ("scroll_depth", metrics.scroll_depth),
                ("focus_ratio", metrics.focus_ratio),
            ] {
                if let Some(value) = value {
                    if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                        return Err(FeedbackError::OutOfRange {
                            field,
                            value,
                            expected: "[0, 1]",
                        });
                    }
                }
            }
            if let Some(dwell) = metrics.dwell_time_secs {
                if !(dwell.is_finite() && dwell >= 0.0) {
                    return Err(FeedbackError::OutOfRange {
                        field: "dwell_time_secs",
                        value: dwell,
                        expected: "[0, ∞)",
                    });
                }
            }
        }

        for sample in &signals.biometrics {
            if !(sample.confidence.is_finite() && (0.0..=1.0).contains(&sample.confidence)) {
                return Err(FeedbackError::OutOfRange {
                    field: "biometric.confidence",
                    value: sample.confidence,
                    expected: "[0, 1]",
                });
            }
        }

        Ok(())
    }

    /// Validate and fuse.
    pub fn fuse(&self, signals: &FeedbackSignals) -> FeedbackResult<FusionOutcome> {
        self.validate(signals)?;

        let self_score = signals.self_report;
        let behavioral_score = signals
            .behavioral
            .as_ref()
            .and_then(|metrics| self.behavioral_score(metrics));
        let biometric_score = self.biometric_score(&signals.biometrics);

        let modalities = ModalitySet {
            self_report: self_score.is_some(),
            behavioral: behavioral_score.is_some(),
            biometric: biometric_score.is_some(),
        };
        if modalities.is_empty() {
            return Ok(FusionOutcome::empty());
        }

        let weights = self.base_weights(modalities);
        let composite = weights.self_report * self_score.unwrap_or(0.0)
            + weights.behavioral * behavioral_score.unwrap_or(0.0)
            + weights.biometric * biometric_score.unwrap_or(0.0);
        let fulfillment_score = composite.clamp(-1.0, 1.0);

        let present: Vec<f64> = [self_score, behavioral_score, biometric_score]
            .into_iter()
            .flatten()
            .collect();
        let confidence = self.confidence(modalities, &present);

        debug!(
            fulfillment = fulfillment_score,
            confidence,
            modalities = modalities.count(),
            "feedback fused"
        );

        Ok(FusionOutcome {
            fulfillment_score,
            confidence,
            modalities,
            weights,
            self_score,
            behavioral_score,
            biometric_score,
        })
    }

    /// Base weight triple for the present set.
    ///
    /// Sets without a self-report reuse the full triple with absent
    /// modalities zeroed and the rest renormalized.
    fn base_weights(&self, present: ModalitySet) -> ModalityWeights {
        match (present.self_report, present.behavioral, present.biometric) {
            (true, true, true) => self.config.full,
            (true, true, false) => self.config.no_biometric,
            (true, false, true) => self.config.no_behavioral,
            (true, false, false) => self.config.self_only,
            (false, behavioral, biometric) => {
                let full = self.config.full;
                let b = if behavioral { full.behavioral } else { 0.0 };
                let m = if biometric { full.biometric } else { 0.0 };
                let sum = b + m;
                if sum <= 0.0 {
                    ModalityWeights::new(0.0, 0.0, 0.0)
                } else {
                    ModalityWeights::new(0.0, b / sum, m / sum)
                }
            }
        }
    }

    /// Weighted behavioral sub-score in [-1, 1], renormalized by the weights
    /// of the metrics actually present. `None` if no metric is present.
    fn behavioral_score(&self, metrics: &BehavioralMetrics) -> Option<f64> {
        let w = &self.config.behavioral_weights;
        let contributions = [
            (w.completion_rate, metrics.completion_rate.map(unit_to_signed)),
            (
                w.dwell_time,
                metrics
                    .dwell_time_secs
                    .map(|d| unit_to_signed((d / self.config.target_dwell_secs).min(1.0))),
            ),
            (w.focus_ratio, metrics.focus_ratio.map(unit_to_signed)),
            (w.scroll_depth, metrics.scroll_depth.map(unit_to_signed)),
            (
                w.revisit_count,
                metrics.revisit_count.map(|n| {
                    unit_to_signed((f64::from(n) / self.config.target_revisits).min(1.0))
                }),
            ),
        ];

        let (weighted, used) = contributions
            .iter()
            .filter_map(|(weight, value)| value.map(|v| (weight * v, *weight)))
            .fold((0.0, 0.0), |(sum, used), (wv, w)| (sum + wv, used + w));

        if used <= 0.0 {
            return None;
        }
        Some((weighted / used).clamp(-1.0, 1.0))
    }

    /// Confidence-weighted mean of normalized biometric samples, rescaled to
    /// [-1, 1]. `None` if no sample carries positive confidence.
    fn biometric_score(&self, samples: &[BiometricSample]) -> Option<f64> {
        let (weighted, total_confidence) = samples
            .iter()
            .filter(|s| s.confidence > 0.0)
            .fold((0.0, 0.0), |(sum, total), s| {
                let normalized = self.config.normalizer.normalize(&s.kind, s.value);
                (sum + normalized * s.confidence, total + s.confidence)
            });

        if total_confidence <= 0.0 {
            return None;
        }
        Some(unit_to_signed(weighted / total_confidence))
    }

    fn confidence(&self, present: ModalitySet, sub_scores: &[f64]) -> f64 {
        let mut coverage = (present.count() as f64 / 3.0).min(1.0);
        if present.self_report {
            coverage = coverage.max(self.config.self_report_confidence_floor);
        }
        let agreement = 1.0 - (std_dev(sub_scores) / self.config.agreement_scale).min(1.0);
        (coverage * agreement).clamp(0.0, 1.0)
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::with_default_config()
    }
}

fn unit_to_signed(value: f64) -> f64 {
    (value.clamp(0.0, 1.0) * 2.0 - 1.0).clamp(-1.0, 1.0)
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
