use serde::{Deserialize, Serialize};

/// Kind of a raw biometric or interaction signal.
///
/// Unrecognized names parse to [`SignalKind::Other`], which normalizes like
/// [`SignalKind::Interaction`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignalKind {
    /// Heart-rate variability in milliseconds.
    Hrv,
    /// Breaths per minute.
    BreathRate,
    /// Galvanic skin response in microsiemens.
    Galvanic,
    /// Motion magnitude.
    Motion,
    /// Generic interaction signal already in [0, 1].
    Interaction,
    Other(String),
}

impl SignalKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hrv => "hrv",
            Self::BreathRate => "breath_rate",
            Self::Galvanic => "galvanic",
            Self::Motion => "motion",
            Self::Interaction => "interaction",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for SignalKind {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "hrv" | "heart_rate_variability" => Self::Hrv,
            "breath_rate" | "breath" | "respiration" => Self::BreathRate,
            "galvanic" | "gsr" | "eda" => Self::Galvanic,
            "motion" | "movement" => Self::Motion,
            "interaction" => Self::Interaction,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl From<String> for SignalKind {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<SignalKind> for String {
    fn from(kind: SignalKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One raw biometric sample with the sensor's own confidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiometricSample {
    pub kind: SignalKind,
    /// Raw value in the signal's native unit.
    pub value: f64,
    /// Sensor confidence in [0, 1].
    pub confidence: f64,
}

impl BiometricSample {
    pub fn new(kind: impl Into<SignalKind>, value: f64, confidence: f64) -> Self {
        Self {
            kind: kind.into(),
            value,
            confidence,
        }
    }
}

/// Behavioral engagement metrics observed after a selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BehavioralMetrics {
    /// Fraction of the item completed, in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revisit_count: Option<u32>,
    /// Dwell time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwell_time_secs: Option<f64>,
    /// Scroll depth in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_depth: Option<f64>,
    /// Fraction of time the item held focus, in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_ratio: Option<f64>,
}

impl BehavioralMetrics {
    pub fn is_empty(&self) -> bool {
        self.completion_rate.is_none()
            && self.revisit_count.is_none()
            && self.dwell_time_secs.is_none()
            && self.scroll_depth.is_none()
            && self.focus_ratio.is_none()
    }
}

/// Raw post-selection feedback, stored verbatim on the feedback record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSignals {
    /// Self-reported outcome in [-1, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_report: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavioral: Option<BehavioralMetrics>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub biometrics: Vec<BiometricSample>,
}

impl FeedbackSignals {
    pub fn self_report(value: f64) -> Self {
        Self {
            self_report: Some(value),
            ..Self::default()
        }
    }

    pub fn with_behavioral(mut self, metrics: BehavioralMetrics) -> Self {
        self.behavioral = Some(metrics);
        self
    }

    pub fn with_biometric(mut self, sample: BiometricSample) -> Self {
        self.biometrics.push(sample);
        self
    }
}
