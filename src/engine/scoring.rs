//! Candidate scoring and ranking
//!
//! A candidate that passes both compatibility predicates is scored
//! `key_weight / (1 + |bpm delta|)`: exact key match weighs 1.0, a merely
//! compatible key 0.8. The division makes tempo distance a smooth,
//! continuous tie-break under the key weight rather than a step function.

use std::cmp::Ordering;

use crate::engine::{bpm_compatible, key_compatible};
use crate::models::Track;

/// Weight for a candidate in the same key as the anchor
const EXACT_KEY_WEIGHT: f64 = 1.0;

/// Weight for a candidate in a compatible-but-different key
const COMPATIBLE_KEY_WEIGHT: f64 = 0.8;

/// Whether two key labels name the same key (enharmonics normalized;
/// unparsable labels compared verbatim)
fn same_key(a: &str, b: &str) -> bool {
    use crate::engine::MusicalKey;
    match (MusicalKey::parse(a), MusicalKey::parse(b)) {
        (Some(ka), Some(kb)) => ka == kb,
        _ => a == b,
    }
}

/// Mix-quality score of `candidate` out of `anchor`
///
/// Only meaningful for candidates that already passed both compatibility
/// predicates; the value is an internal ranking artifact, never exposed.
pub fn mix_score(anchor: &Track, candidate: &Track) -> f64 {
    let delta = f64::from(anchor.bpm_or_default()) - f64::from(candidate.bpm_or_default());
    let key_weight = if same_key(anchor.key_or_default(), candidate.key_or_default()) {
        EXACT_KEY_WEIGHT
    } else {
        COMPATIBLE_KEY_WEIGHT
    };
    key_weight / (1.0 + delta.abs())
}

/// Filter `candidates` down to those mixable out of `anchor`, rank them by
/// score descending (ties broken by id ascending, so ordering is
/// deterministic), and keep the best `top_n`.
pub fn rank_candidates(
    anchor: &Track,
    candidates: Vec<Track>,
    bpm_tolerance: u32,
    top_n: usize,
) -> Vec<Track> {
    let mut scored: Vec<(f64, Track)> = candidates
        .into_iter()
        .filter(|c| {
            key_compatible(anchor.key_or_default(), c.key_or_default())
                && bpm_compatible(anchor.bpm_or_default(), c.bpm_or_default(), bpm_tolerance)
        })
        .map(|c| (mix_score(anchor, &c), c))
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.id.cmp(&b.1.id))
    });
    scored.truncate(top_n);

    scored.into_iter().map(|(_, track)| track).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, key: &str, bpm: u32) -> Track {
        Track {
            key: Some(key.to_string()),
            bpm: Some(bpm),
            ..Track::stub(id)
        }
    }

    #[test]
    fn closer_tempo_scores_at_least_as_high() {
        let anchor = track("anchor", "Am", 128);
        let near = track("near", "C", 129);
        let far = track("far", "C", 132);
        assert!(mix_score(&anchor, &near) > mix_score(&anchor, &far));
    }

    #[test]
    fn exact_key_outranks_compatible_key_at_equal_distance() {
        let anchor = track("anchor", "Am", 128);
        let exact = track("exact", "Am", 128);
        let compatible = track("compat", "C", 128);
        assert!(mix_score(&anchor, &exact) > mix_score(&anchor, &compatible));
    }

    #[test]
    fn enharmonic_spelling_counts_as_exact_key() {
        let anchor = track("anchor", "Bb", 128);
        let enharmonic = track("enh", "A#", 128);
        assert_eq!(mix_score(&anchor, &enharmonic), 1.0);
    }

    #[test]
    fn score_decays_smoothly_from_key_weight() {
        let anchor = track("anchor", "Am", 128);
        let same = track("same", "Am", 128);
        assert_eq!(mix_score(&anchor, &same), 1.0);
        let off_by_one = track("off", "Am", 129);
        assert!(mix_score(&anchor, &off_by_one) < 1.0);
        assert!(mix_score(&anchor, &off_by_one) > 0.0);
    }

    #[test]
    fn rank_rejects_candidates_failing_either_predicate() {
        let anchor = track("anchor", "Am", 128);
        let good = track("good", "C", 130);
        let wrong_key = track("bad-key", "B", 128);
        let wrong_bpm = track("bad-bpm", "Am", 150);

        let ranked = rank_candidates(&anchor, vec![good, wrong_key, wrong_bpm], 5, 10);
        let ids: Vec<&str> = ranked.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["good"]);
    }

    #[test]
    fn rank_orders_by_score_then_id() {
        let anchor = track("anchor", "Am", 128);
        // Same score pair (same key, same distance) plus one clear winner
        let winner = track("aaa", "Am", 128);
        let tie_b = track("bbb", "C", 130);
        let tie_a = track("abc", "C", 130);

        let ranked = rank_candidates(&anchor, vec![tie_b, winner, tie_a], 5, 10);
        let ids: Vec<&str> = ranked.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["aaa", "abc", "bbb"]);
    }

    #[test]
    fn rank_truncates_to_top_n() {
        let anchor = track("anchor", "Am", 128);
        let pool: Vec<Track> = (0..8)
            .map(|i| track(&format!("t{}", i), "Am", 128 + i))
            .collect();
        assert_eq!(rank_candidates(&anchor, pool.clone(), 10, 5).len(), 5);
        assert_eq!(rank_candidates(&anchor, pool, 10, 20).len(), 8);
    }

    #[test]
    fn defaults_apply_when_metadata_is_missing() {
        // Anchor with no key/bpm behaves as C @ 128
        let anchor = Track::stub("anchor");
        let candidate = track("cand", "Am", 130);
        let ranked = rank_candidates(&anchor, vec![candidate], 5, 5);
        assert_eq!(ranked.len(), 1);
    }
}
