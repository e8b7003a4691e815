#![deny(unsafe_code)]
//! # attune-selection
//!
//! Scores the applicable candidates for a user and samples one of them.
//!
//! ```text
//! score = α·patternMatch + β·resonance + γ·learning_weight − δ·(exp(fatigue/10) − 1)
//! ```
//!
//! The top-K scores go through a low-temperature softmax and one candidate is
//! drawn by inverse CDF from a caller-supplied uniform draw, so selection is
//! reproducible under a seeded random source.
//!
//! Scoring is vectorized when the caller supplies a user embedding and falls
//! back to pattern-free scoring otherwise; both paths run through one engine.

pub mod config;
pub mod engine;
pub mod error;
pub mod sampling;
pub mod scoring;

pub use config::SelectionConfig;
pub use engine::{ScoredCandidate, ScoringMode, SelectionDecision, SelectionEngine, SelectionRequest};
pub use error::{SelectionError, SelectionResult};
pub use sampling::{inverse_cdf, softmax};
pub use scoring::{cosine_similarity, fatigue_penalty};
