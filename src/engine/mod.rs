//! Compatibility engine
//!
//! Pure functions deciding whether two tracks are mixable and how well.
//! No state, no I/O; everything here is unit-testable in isolation.

pub mod key;
pub mod scoring;
pub mod tempo;

pub use key::{key_compatible, MusicalKey};
pub use scoring::{mix_score, rank_candidates};
pub use tempo::{bpm_compatible, DEFAULT_BPM_TOLERANCE};
