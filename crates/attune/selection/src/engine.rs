use crate::config::SelectionConfig;
use crate::error::{SelectionError, SelectionResult};
use crate::sampling::{inverse_cdf, softmax};
use crate::scoring::{cosine_similarity, fatigue_penalty};
use attune_types::{Candidate, CandidateId, ResonanceState};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// What the engine knows about the user for one request.
#[derive(Clone, Copy, Debug)]
pub struct SelectionRequest<'a> {
    pub resonance: ResonanceState,
    pub state_tag: Option<&'a str>,
    /// User-state embedding; `None` selects non-vectorized scoring.
    pub embedding: Option<&'a [f32]>,
}

/// Which scoring path produced a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    Vectorized,
    Unvectorized,
}

impl std::fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vectorized => write!(f, "vectorized"),
            Self::Unvectorized => write!(f, "unvectorized"),
        }
    }
}

/// Score breakdown of one applicable candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate_id: CandidateId,
    pub pattern_match: f64,
    pub fatigue_penalty: f64,
    pub learning_weight: f64,
    pub score: f64,
    /// Sampling probability; 0 outside the top-K.
    pub probability: f64,
}

/// Outcome of one selection: the chosen candidate plus the evidence for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionDecision {
    pub selected: CandidateId,
    pub mode: ScoringMode,
    /// Applicable candidates, best first.
    pub ranked: Vec<ScoredCandidate>,
    pub reasoning: String,
}

impl SelectionDecision {
    pub fn selected_score(&self) -> Option<&ScoredCandidate> {
        self.ranked.iter().find(|c| c.candidate_id == self.selected)
    }
}

/// Scores applicable candidates and samples one.
pub struct SelectionEngine {
    config: SelectionConfig,
}

impl SelectionEngine {
    pub fn new(config: SelectionConfig) -> SelectionResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_default_config() -> Self {
        Self {
            config: SelectionConfig::default(),
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Select using a draw from `rng`.
    pub fn select_with_rng<R: Rng + ?Sized>(
        &self,
        request: &SelectionRequest<'_>,
        pool: &[Candidate],
        rng: &mut R,
    ) -> SelectionResult<SelectionDecision> {
        let draw: f64 = rng.gen();
        self.select(request, pool, draw)
    }

    /// Select with an explicit uniform draw in [0, 1).
    ///
    /// Fails with [`SelectionError::NoApplicableCandidates`] when no candidate
    /// passes the state filter.
    pub fn select(
        &self,
        request: &SelectionRequest<'_>,
        pool: &[Candidate],
        draw: f64,
    ) -> SelectionResult<SelectionDecision> {
        let applicable: Vec<&Candidate> = pool
            .iter()
            .filter(|c| c.applies_to(request.state_tag))
            .collect();
        if applicable.is_empty() {
            return Err(SelectionError::NoApplicableCandidates {
                state_tag: request.state_tag.map(str::to_string),
                pool_size: pool.len(),
            });
        }

        let embedding = request.embedding.filter(|e| !e.is_empty());
        let mode = if embedding.is_some() {
            ScoringMode::Vectorized
        } else {
            ScoringMode::Unvectorized
        };

        let mut ranked: Vec<ScoredCandidate> = applicable
            .iter()
            .map(|c| self.score(c, request.resonance, embedding))
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        });

        let k = self.config.top_k.min(ranked.len());
        let top_scores: Vec<f64> = ranked[..k].iter().map(|c| c.score).collect();
        let probabilities = softmax(&top_scores, self.config.temperature);
        for (scored, p) in ranked.iter_mut().zip(probabilities.iter()) {
            scored.probability = *p;
        }

        let index = inverse_cdf(&probabilities, draw).unwrap_or(0);
        let chosen = &ranked[index];
        let reasoning = format!(
            "{} scoring over {} applicable candidate(s); selected {} (score {:.3}, p={:.2}, rank {}/{}): \
             pattern {:.2}, resonance {:.2}, weight {:.2}, fatigue penalty {:.2}",
            mode,
            ranked.len(),
            chosen.candidate_id,
            chosen.score,
            chosen.probability,
            index + 1,
            k,
            chosen.pattern_match,
            request.resonance.value(),
            chosen.learning_weight,
            chosen.fatigue_penalty,
        );

        debug!(
            selected = %chosen.candidate_id,
            score = chosen.score,
            probability = chosen.probability,
            applicable = ranked.len(),
            mode = %mode,
            "candidate selected"
        );

        Ok(SelectionDecision {
            selected: chosen.candidate_id.clone(),
            mode,
            ranked,
            reasoning,
        })
    }

    fn score(
        &self,
        candidate: &Candidate,
        resonance: ResonanceState,
        embedding: Option<&[f32]>,
    ) -> ScoredCandidate {
        let pattern_match = match (embedding, candidate.pattern.as_deref()) {
            (Some(user), Some(pattern)) => cosine_similarity(user, pattern),
            _ => 0.0,
        };
        let penalty = fatigue_penalty(candidate.fatigue_score(), self.config.fatigue_scale);
        let score = self.config.pattern_weight * pattern_match
            + self.config.resonance_weight * resonance.value()
            + self.config.learning_weight * candidate.learning_weight()
            - self.config.fatigue_weight * penalty;

        ScoredCandidate {
            candidate_id: candidate.id.clone(),
            pattern_match,
            fatigue_penalty: penalty,
            learning_weight: candidate.learning_weight(),
            score,
            probability: 0.0,
        }
    }
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::with_default_config()
    }
}
