//! Scoring primitives.

/// Cosine similarity between two vectors.
///
/// Returns 0 when the dimensions differ, either vector is empty, or either
/// has zero norm. Degenerate input never errors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f64::EPSILON || !denom.is_finite() {
        return 0.0;
    }
    let similarity = dot / denom;
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// `exp(fatigue / scale) − 1`; zero for fresh candidates.
pub fn fatigue_penalty(fatigue: f64, scale: f64) -> f64 {
    (fatigue.max(0.0) / scale).exp() - 1.0
}
