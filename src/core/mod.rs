//! Core deterministic primitives.
//!
//! The PRNG and seed derivation that make a match reproducible from its
//! seed alone.

pub mod rng;

// Re-export core types
pub use rng::{derive_match_seed, DeterministicRng};
