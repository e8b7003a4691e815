#![deny(unsafe_code)]
//! # attune-harmonizer
//!
//! Periodic stability check over a user's recent selection trajectory.
//!
//! - [`EntropyAnalyzer`] turns the last selections into [`EntropyMetrics`]
//!   (branch divergence, resonance spread, field fragmentation).
//! - [`ActionPlanner`] classifies the metrics and chooses corrective actions,
//!   then derives the weight writes those actions imply.
//! - [`Harmonizer`] enforces the guard interval and applies the writes as
//!   one all-or-nothing batch before recording the cycle.
//!
//! [`EntropyMetrics`]: attune_types::EntropyMetrics

pub mod analyzer;
pub mod config;
pub mod error;
pub mod harmonizer;
pub mod planner;

pub use analyzer::EntropyAnalyzer;
pub use config::{ActionThresholds, EntropyWeights, HarmonizerConfig};
pub use error::{HarmonizerError, HarmonizerResult};
pub use harmonizer::{HarmonizationOutcome, HarmonizationReport, Harmonizer};
pub use planner::{ActionPlanner, WeightChange};
