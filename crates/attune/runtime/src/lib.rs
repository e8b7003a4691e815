#![deny(unsafe_code)]
//! # attune-runtime
//!
//! The operations exposed to callers of the adaptive loop, wired to their
//! collaborators:
//!
//! - [`AttuneRuntime::select_candidate`] reads user state, optionally embeds
//!   a text signal, selects a candidate and bumps its fatigue
//! - [`AttuneRuntime::submit_feedback`] fuses feedback and applies the
//!   confidence-scaled weight update
//! - [`AttuneRuntime::run_harmonization_cycle`] runs the entropy monitor
//!
//! Storage calls are bounded by [`TimedStore`]; embedding failures degrade
//! to pattern-free scoring, event log failures are logged and counted.

pub mod clock;
pub mod collaborators;
pub mod config;
pub mod embedding;
pub mod error;
pub mod metrics;
pub mod runtime;
pub mod timed;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collaborators::{EmbeddingService, InMemoryUserStateStore, UserStateStore};
pub use config::AttuneConfig;
pub use embedding::HashEmbedder;
pub use error::{RuntimeError, RuntimeResult};
pub use metrics::{MetricsSnapshot, RuntimeMetrics};
pub use runtime::{AttuneRuntime, FeedbackOutcome, FeedbackSubmission, SelectionOutcome};
pub use timed::TimedStore;

pub use attune_harmonizer::{HarmonizationOutcome, HarmonizationReport};
