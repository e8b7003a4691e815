//! Attune storage contracts.
//!
//! This crate defines the two persistence seams of the adaptive core:
//! - a versioned candidate repository with optimistic compare-and-swap,
//!   the only shared-mutable state in the system
//! - an append-only event log for selection, feedback and harmonization
//!   records, sequenced per user
//!
//! Design stance:
//! - every weight or fatigue mutation is a CAS against a known version;
//!   read-modify-write without a version check is not expressible here
//! - batch CAS is all-or-nothing so multi-candidate corrections never land
//!   partially

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
pub mod memory;
mod retry;
mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryAttuneStore;
pub use retry::{update_candidate, DEFAULT_CAS_ATTEMPTS};
pub use traits::{AttuneStore, CandidateStore, CasUpdate, EventLog, QueryWindow};
