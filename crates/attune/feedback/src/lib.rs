#![deny(unsafe_code)]
//! # attune-feedback
//!
//! Turns post-selection feedback into a learning signal.
//!
//! 1. [`FusionEngine`] fuses self-report, behavioral metrics and biometric
//!    samples into a fulfillment score in [-1, 1] with a confidence in [0, 1].
//! 2. [`WeightUpdater`] applies `η·(0.5 + 0.5·confidence)·fulfillment` to the
//!    candidate's learning weight through a versioned compare-and-swap.
//!
//! Fusion is pure; only the updater touches storage.

pub mod config;
pub mod error;
pub mod fusion;
pub mod updater;

pub use config::{BehavioralWeights, FusionConfig, ModalityWeights, UpdaterConfig};
pub use error::{FeedbackError, FeedbackResult};
pub use fusion::{FusionEngine, FusionOutcome, ModalitySet};
pub use updater::{AppliedUpdate, WeightStep, WeightUpdater};
