//! Tempo compatibility
//!
//! Two tempos are mixable when they sit within a tolerance of each other
//! directly, or at double or half time. The tolerance models the
//! pitch-shift range available during a live transition.

/// Acceptable BPM drift during a transition, in beats per minute
pub const DEFAULT_BPM_TOLERANCE: u32 = 5;

/// Whether `target` is mixable out of `current` within `tolerance` BPM
///
/// Holds when any of direct, double-time or half-time distance is within
/// tolerance. Half-time of an odd BPM lands on a .5 fraction, so the
/// comparison runs on floats even though tempos are stored as integers.
pub fn bpm_compatible(current: u32, target: u32, tolerance: u32) -> bool {
    let current = f64::from(current);
    let target = f64::from(target);
    let tolerance = f64::from(tolerance);

    (current - target).abs() <= tolerance
        || (current * 2.0 - target).abs() <= tolerance
        || (current / 2.0 - target).abs() <= tolerance
}
