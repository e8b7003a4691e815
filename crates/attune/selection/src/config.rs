use crate::error::{SelectionError, SelectionResult};
use serde::{Deserialize, Serialize};

/// Scoring weights and sampling parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// α: weight of the pattern match.
    pub pattern_weight: f64,
    /// β: weight of the user's resonance.
    pub resonance_weight: f64,
    /// γ: weight of the candidate's learning weight.
    pub learning_weight: f64,
    /// δ: weight of the fatigue penalty.
    pub fatigue_weight: f64,
    /// Divisor inside the fatigue exponential.
    pub fatigue_scale: f64,
    /// Number of top-scored candidates eligible for sampling.
    pub top_k: usize,
    /// Softmax temperature.
    pub temperature: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            pattern_weight: 0.4,
            resonance_weight: 0.3,
            learning_weight: 0.2,
            fatigue_weight: 0.1,
            fatigue_scale: 10.0,
            top_k: 5,
            temperature: 0.2,
        }
    }
}

impl SelectionConfig {
    /// Broader exploration for demos: more candidates, warmer softmax.
    pub fn exploratory() -> Self {
        Self {
            top_k: 8,
            temperature: 0.5,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SelectionResult<()> {
        if self.top_k == 0 {
            return Err(SelectionError::InvalidConfig("top_k must be at least 1".into()));
        }
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(SelectionError::InvalidConfig(format!(
                "temperature must be positive, got {}",
                self.temperature
            )));
        }
        if !(self.fatigue_scale.is_finite() && self.fatigue_scale > 0.0) {
            return Err(SelectionError::InvalidConfig(format!(
                "fatigue_scale must be positive, got {}",
                self.fatigue_scale
            )));
        }
        let weights = [
            self.pattern_weight,
            self.resonance_weight,
            self.learning_weight,
            self.fatigue_weight,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SelectionError::InvalidConfig(
                "scoring weights must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}
