//! Shared fixtures for the cross-crate test suites.

use attune_runtime::{AttuneConfig, AttuneRuntime, InMemoryUserStateStore, ManualClock};
use attune_store::InMemoryAttuneStore;
use attune_types::{Candidate, UserState};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

/// Fixed start time for every suite.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 2, 7, 30, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// A runtime over in-memory collaborators with handles to each of them.
pub struct Harness {
    pub runtime: Arc<AttuneRuntime>,
    pub store: Arc<InMemoryAttuneStore>,
    pub users: Arc<InMemoryUserStateStore>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    /// Build a harness; panics on invalid fixtures since it only serves tests.
    pub fn new(config: AttuneConfig, candidates: Vec<Candidate>, users: Vec<UserState>) -> Self {
        let store = Arc::new(
            InMemoryAttuneStore::with_candidates(candidates).unwrap_or_else(|e| panic!("{e}")),
        );
        let user_states = Arc::new(InMemoryUserStateStore::new());
        for state in users {
            user_states.upsert(state).unwrap_or_else(|e| panic!("{e}"));
        }
        let clock = Arc::new(ManualClock::new(t0()));
        let runtime = AttuneRuntime::new(config, store.clone(), user_states.clone())
            .unwrap_or_else(|e| panic!("{e}"))
            .with_clock(clock.clone());

        Self {
            runtime: Arc::new(runtime),
            store,
            users: user_states,
            clock,
        }
    }

    /// Seeded default configuration.
    pub fn seeded(candidates: Vec<Candidate>, users: Vec<UserState>) -> Self {
        let config = AttuneConfig {
            rng_seed: Some(11),
            ..AttuneConfig::default()
        };
        Self::new(config, candidates, users)
    }
}
