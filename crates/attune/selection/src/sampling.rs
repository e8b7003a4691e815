//! Softmax and inverse-CDF sampling.

/// Temperature-scaled softmax over `scores`.
///
/// Logits are max-subtracted before exponentiation. If the normalizer
/// underflows, the distribution falls back to uniform.
pub fn softmax(scores: &[f64], temperature: f64) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }
    let temperature = if temperature > 0.0 { temperature } else { f64::EPSILON };

    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut exps: Vec<f64> = scores
        .iter()
        .map(|score| ((score - max) / temperature).exp())
        .collect();
    let sum: f64 = exps.iter().sum();
    if !(sum.is_finite() && sum > f64::EPSILON) {
        let uniform = 1.0 / scores.len() as f64;
        return vec![uniform; scores.len()];
    }
    for value in exps.iter_mut() {
        *value /= sum;
    }
    exps
}

/// Index selected by a uniform draw `u` against the cumulative distribution.
///
/// `u` is clamped into [0, 1); the last index absorbs rounding error. Returns
/// `None` only for an empty distribution.
pub fn inverse_cdf(probabilities: &[f64], u: f64) -> Option<usize> {
    if probabilities.is_empty() {
        return None;
    }
    let u = if u.is_finite() { u.clamp(0.0, 1.0 - f64::EPSILON) } else { 0.0 };

    let mut cumulative = 0.0;
    for (index, p) in probabilities.iter().enumerate() {
        cumulative += p;
        if u < cumulative {
            return Some(index);
        }
    }
    Some(probabilities.len() - 1)
}
