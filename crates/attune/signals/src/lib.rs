#![deny(unsafe_code)]
//! # attune-signals
//!
//! Stateless mapping from `(signal kind, raw value)` to a normalized score in
//! [0, 1]. Higher is always "more regulated":
//!
//! - **HRV**: linear ramp between physiological bounds
//! - **Breath rate**: inverted distance from an optimal rate
//! - **Galvanic response**: inverted linear scale
//! - **Motion**: inverted magnitude
//! - **Interaction** and unknown kinds: passed through, clamped

mod normalizer;

pub use normalizer::{normalize, NormalizerBounds};
