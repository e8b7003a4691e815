#![deny(unsafe_code)]
//! # attune-types
//!
//! Shared vocabulary of the Attune adaptive selection core.
//!
//! - [`Candidate`]: a weighted, selectable item with adaptive state
//! - [`ResonanceState`] and [`UserState`]: the per-user view read by selection
//!   and the entropy monitor
//! - append-only records: [`SelectionEvent`], [`FeedbackRecord`],
//!   [`HarmonizationEvent`]
//!
//! Every bounded scalar is clamped at construction so the range invariants
//! hold for any value that exists in memory.

mod candidate;
mod feedback;
mod harmonization;
mod ids;
mod records;
mod resonance;

pub use candidate::{Candidate, VersionedCandidate};
pub use feedback::{BehavioralMetrics, BiometricSample, FeedbackSignals, SignalKind};
pub use harmonization::{EntropyMetrics, HarmonizationAction, StabilityStatus};
pub use ids::{CandidateId, EventId, UserId};
pub use records::{FeedbackRecord, HarmonizationEvent, SelectionEvent};
pub use resonance::{ResonanceState, UserState};
