use crate::config::HarmonizerConfig;
use attune_types::{EntropyMetrics, SelectionEvent};
use std::collections::BTreeMap;

/// Computes entropy metrics over a chronological selection window.
///
/// Pure: the same window always yields the same metrics.
pub struct EntropyAnalyzer {
    config: HarmonizerConfig,
}

impl EntropyAnalyzer {
    pub fn new(config: HarmonizerConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self::new(HarmonizerConfig::default())
    }

    /// Analyze `events`, oldest first. Only the last `window_size` are used.
    pub fn analyze(&self, events: &[SelectionEvent]) -> EntropyMetrics {
        let start = events.len().saturating_sub(self.config.window_size);
        let window = &events[start..];

        if window.len() < 2 {
            return EntropyMetrics {
                sample_size: window.len(),
                ..EntropyMetrics::default()
            };
        }

        let branch_divergence = self.branch_divergence(window);
        let ri_variance = ri_spread(window);
        let field_fragmentation = field_fragmentation(window);
        let w = &self.config.weights;
        let overall_entropy = w.branch_divergence * branch_divergence
            + w.ri_variance * ri_variance
            + w.field_fragmentation * field_fragmentation;

        EntropyMetrics {
            branch_divergence,
            ri_variance,
            field_fragmentation,
            overall_entropy,
            sample_size: window.len(),
        }
    }

    /// Mean pairwise dissimilarity between each event and its next neighbors.
    fn branch_divergence(&self, window: &[SelectionEvent]) -> f64 {
        let mut total = 0.0;
        let mut pairs = 0usize;

        for (i, a) in window.iter().enumerate() {
            let end = (i + self.config.divergence_neighbors).min(window.len() - 1);
            for b in &window[i + 1..=end] {
                total += pair_dissimilarity(a, b);
                pairs += 1;
            }
        }

        if pairs == 0 {
            0.0
        } else {
            total / pairs as f64
        }
    }
}

impl Default for EntropyAnalyzer {
    fn default() -> Self {
        Self::with_default_config()
    }
}

fn pair_dissimilarity(a: &SelectionEvent, b: &SelectionEvent) -> f64 {
    let resonance = (a.resonance.value() - b.resonance.value()).abs();
    let tag = mismatch(&a.state_tag, &b.state_tag);
    let profile = mismatch(&a.profile, &b.profile);
    (resonance + tag + profile) / 3.0
}

fn mismatch(a: &Option<String>, b: &Option<String>) -> f64 {
    if a == b {
        0.0
    } else {
        1.0
    }
}

/// Population standard deviation of resonance.
///
/// Deviations are taken relative to the first sample so a window of equal
/// values yields exactly 0.
fn ri_spread(window: &[SelectionEvent]) -> f64 {
    let Some(first) = window.first() else {
        return 0.0;
    };
    let origin = first.resonance.value();
    let n = window.len() as f64;
    let shifted: Vec<f64> = window
        .iter()
        .map(|e| e.resonance.value() - origin)
        .collect();
    let mean = shifted.iter().sum::<f64>() / n;
    let variance = shifted.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Shannon entropy of selection frequencies, normalized to [0, 1].
fn field_fragmentation(window: &[SelectionEvent]) -> f64 {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for event in window {
        *counts.entry(event.candidate_id.as_str()).or_default() += 1;
    }

    let distinct = counts.len();
    if distinct < 2 {
        return 0.0;
    }

    let n = window.len() as f64;
    let entropy: f64 = counts
        .values()
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.ln()
        })
        .sum();
    (entropy / (distinct as f64).ln()).clamp(0.0, 1.0)
}
