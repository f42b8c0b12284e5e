//! Set session model
//!
//! One in-progress set per user. A session is created by start-set
//! (silently replacing any prior session for that user) and mutated only by
//! committing a track, which also refreshes the suggestion pool.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Track;

/// Outcome of resolving a committed track id against the catalog
///
/// Commit never fails on resolution problems; the caller is told which of
/// the two shapes it got instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    /// Full metadata retrieved from the catalog
    Resolved,
    /// Catalog unavailable or track unknown; id-only stub stored
    Stub,
}

/// In-progress set for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSession {
    /// Session identity, fresh per start-set (diagnostics and responses)
    pub session_id: Uuid,

    pub user_id: String,

    /// Scope chosen at session start, immutable for the session's lifetime
    pub genre: String,
    pub country: String,

    /// Committed tracks in playback order
    pub set_list: Vec<Track>,

    /// Last-computed recommendation pool (displayable)
    pub suggestions: Vec<Track>,

    /// Every id ever surfaced to this user: the trending seed plus each
    /// recommendation cycle's output. Exclusion is cumulative for the whole
    /// session; ids are never removed.
    pub surfaced_ids: HashSet<String>,

    pub started_at: DateTime<Utc>,
}

impl SetSession {
    pub fn new(
        user_id: impl Into<String>,
        genre: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id: user_id.into(),
            genre: genre.into(),
            country: country.into(),
            set_list: Vec::new(),
            suggestions: Vec::new(),
            surfaced_ids: HashSet::new(),
            started_at: Utc::now(),
        }
    }

    /// The most recently committed track, the sole anchor for the next
    /// recommendation cycle
    pub fn anchor(&self) -> Option<&Track> {
        self.set_list.last()
    }

    /// Append a committed track to the set list
    pub fn commit(&mut self, track: Track) {
        self.set_list.push(track);
    }

    /// Replace the suggestion pool and record its ids as surfaced
    pub fn surface(&mut self, tracks: Vec<Track>) {
        self.surfaced_ids
            .extend(tracks.iter().map(|t| t.id.clone()));
        self.suggestions = tracks;
    }

    /// Whether a track id has already been played in this set
    pub fn is_used(&self, id: &str) -> bool {
        self.set_list.iter().any(|t| t.id == id)
    }

    /// Whether a track id has already been shown to the user
    pub fn is_surfaced(&self, id: &str) -> bool {
        self.surfaced_ids.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_empty() {
        let s = SetSession::new("u1", "techno", "Germany");
        assert!(s.set_list.is_empty());
        assert!(s.suggestions.is_empty());
        assert!(s.surfaced_ids.is_empty());
        assert!(s.anchor().is_none());
    }

    #[test]
    fn commit_appends_in_order() {
        let mut s = SetSession::new("u1", "", "");
        s.commit(Track::stub("a"));
        s.commit(Track::stub("b"));
        assert_eq!(s.set_list.len(), 2);
        assert_eq!(s.anchor().unwrap().id, "b");
        assert!(s.is_used("a"));
        assert!(!s.is_used("c"));
    }

    #[test]
    fn surface_replaces_pool_but_accumulates_ids() {
        let mut s = SetSession::new("u1", "", "");
        s.surface(vec![Track::stub("a"), Track::stub("b")]);
        s.surface(vec![Track::stub("c")]);

        // Displayable pool is the latest cycle only
        assert_eq!(s.suggestions.len(), 1);
        assert_eq!(s.suggestions[0].id, "c");

        // Exclusion set remembers every cycle
        assert!(s.is_surfaced("a"));
        assert!(s.is_surfaced("b"));
        assert!(s.is_surfaced("c"));
    }
}
