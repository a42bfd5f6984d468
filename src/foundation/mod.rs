//! Shared primitives: geometry, pixel formats, deterministic randomness and the crate error type.

pub mod core;
pub mod error;
pub mod rng;
