//! Set recommender
//!
//! Orchestrates the session store, the compatibility engine and the track
//! catalog: starting sessions, committing tracks, and re-deriving the
//! suggestion pool from the most recently committed track.
//!
//! Catalog failures never fail these operations; after the single retry
//! they degrade to an empty pool (or an id-only stub at commit time) and
//! are logged.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::engine::{rank_candidates, DEFAULT_BPM_TOLERANCE};
use crate::error::{Error, Result};
use crate::models::{ResolutionStatus, SetSession, Track};
use crate::services::catalog::{with_retry, TrackCatalog};
use crate::store::{SessionRepository, UserLocks};

/// Default number of suggestions per cycle
pub const DEFAULT_TOP_N: usize = 5;

/// Fixed delay before the single catalog retry
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Tunables for a recommender instance
#[derive(Debug, Clone)]
pub struct RecommenderSettings {
    pub bpm_tolerance: u32,
    pub top_n: usize,
    pub retry_delay: Duration,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            bpm_tolerance: DEFAULT_BPM_TOLERANCE,
            top_n: DEFAULT_TOP_N,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Result of committing a track
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    /// The committed track exactly as stored in the set list
    pub track: Track,
    /// Whether full detail was resolved or an id-only stub stored
    pub resolution: ResolutionStatus,
    /// The refreshed suggestion pool
    pub suggestions: Vec<Track>,
}

pub struct Recommender {
    store: Arc<dyn SessionRepository>,
    catalog: Arc<dyn TrackCatalog>,
    locks: UserLocks,
    settings: RecommenderSettings,
}

impl Recommender {
    pub fn new(
        store: Arc<dyn SessionRepository>,
        catalog: Arc<dyn TrackCatalog>,
        settings: RecommenderSettings,
    ) -> Self {
        Self {
            store,
            catalog,
            locks: UserLocks::new(),
            settings,
        }
    }

    /// Start a set session for the user, replacing any prior one
    ///
    /// The suggestion pool is seeded with trending tracks for the chosen
    /// scope. Empty genre/country are legal ("no scope") and pass through
    /// to the catalog untouched.
    pub async fn start_session(
        &self,
        user_id: &str,
        genre: &str,
        country: &str,
    ) -> Result<SetSession> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(Error::InvalidInput("user_id is required".to_string()));
        }

        let _guard = self.locks.acquire(user_id).await;

        let trending = match with_retry("fetch trending", self.settings.retry_delay, || {
            self.catalog.fetch_trending(genre, country)
        })
        .await
        {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(user_id, error = %e, "trending fetch failed, starting with empty pool");
                Vec::new()
            }
        };

        let mut session = SetSession::new(user_id, genre, country);
        session.surface(trending);

        info!(
            user_id,
            session_id = %session.session_id,
            genre,
            country,
            seeded = session.suggestions.len(),
            "set session started"
        );

        self.store.put(session.clone()).await;
        Ok(session)
    }

    /// Commit a track to the user's set and refresh the suggestion pool
    ///
    /// Detail resolution is best-effort: when the catalog cannot deliver
    /// metadata the commit still goes through with an id-only stub, and
    /// the outcome says which shape was stored.
    pub async fn commit_track(&self, user_id: &str, track_id: &str) -> Result<CommitOutcome> {
        let user_id = user_id.trim();
        if track_id.trim().is_empty() {
            return Err(Error::InvalidInput("track_id is required".to_string()));
        }

        let _guard = self.locks.acquire(user_id).await;

        let mut session = self
            .store
            .get(user_id)
            .await
            .ok_or_else(|| Error::NoActiveSession(user_id.to_string()))?;

        let (track, resolution) =
            match with_retry("resolve track detail", self.settings.retry_delay, || {
                self.catalog.resolve_detail(track_id)
            })
            .await
            {
                Ok(Some(track)) => (track, ResolutionStatus::Resolved),
                Ok(None) => {
                    warn!(user_id, track_id, "track unknown to catalog, committing stub");
                    (Track::stub(track_id), ResolutionStatus::Stub)
                }
                Err(e) => {
                    warn!(user_id, track_id, error = %e, "detail resolution failed, committing stub");
                    (Track::stub(track_id), ResolutionStatus::Stub)
                }
            };

        session.commit(track.clone());

        let suggestions = self.derive_suggestions(&session).await;
        session.surface(suggestions.clone());

        info!(
            user_id,
            track_id,
            resolution = ?resolution,
            set_length = session.set_list.len(),
            suggested = suggestions.len(),
            "track committed"
        );

        self.store.put(session).await;
        Ok(CommitOutcome {
            track,
            resolution,
            suggestions,
        })
    }

    /// Re-derive suggestions from the current anchor and store them as
    /// the session's new surfaced pool
    ///
    /// A session with no committed tracks has no anchor to mix from and
    /// yields an empty pool (by contract, not an error).
    pub async fn suggestions(&self, user_id: &str) -> Result<Vec<Track>> {
        let user_id = user_id.trim();
        let _guard = self.locks.acquire(user_id).await;

        let mut session = self
            .store
            .get(user_id)
            .await
            .ok_or_else(|| Error::NoActiveSession(user_id.to_string()))?;

        if session.set_list.is_empty() {
            return Ok(Vec::new());
        }

        let suggestions = self.derive_suggestions(&session).await;
        session.surface(suggestions.clone());
        self.store.put(session).await;
        Ok(suggestions)
    }

    /// The user's committed tracks in playback order; empty when no
    /// session exists (never an error)
    pub async fn committed_tracks(&self, user_id: &str) -> Vec<Track> {
        match self.store.get(user_id.trim()).await {
            Some(session) => session.set_list,
            None => Vec::new(),
        }
    }

    /// Trending tracks for an arbitrary scope (stateless browse)
    pub async fn trending(&self, genre: &str, country: &str) -> Vec<Track> {
        match with_retry("fetch trending", self.settings.retry_delay, || {
            self.catalog.fetch_trending(genre, country)
        })
        .await
        {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(genre, country, error = %e, "trending fetch failed");
                Vec::new()
            }
        }
    }

    /// One recommendation cycle: fetch candidates for the session scope,
    /// drop used and already-surfaced ids, gate on both compatibility
    /// predicates against the anchor, rank, truncate.
    async fn derive_suggestions(&self, session: &SetSession) -> Vec<Track> {
        let Some(anchor) = session.anchor() else {
            return Vec::new();
        };

        let candidates = match with_retry("fetch candidates", self.settings.retry_delay, || {
            self.catalog
                .fetch_candidates(&session.genre, &session.country, &session.surfaced_ids)
        })
        .await
        {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(
                    user_id = %session.user_id,
                    error = %e,
                    "candidate fetch failed, no suggestions this cycle"
                );
                return Vec::new();
            }
        };

        let fetched = candidates.len();
        // The catalog is asked to exclude surfaced ids itself, but an
        // unfaithful provider must not break the no-repeat invariants
        let fresh: Vec<Track> = candidates
            .into_iter()
            .filter(|t| !session.is_used(&t.id) && !session.is_surfaced(&t.id))
            .collect();

        let ranked = rank_candidates(
            anchor,
            fresh,
            self.settings.bpm_tolerance,
            self.settings.top_n,
        );

        debug!(
            user_id = %session.user_id,
            anchor = %anchor.id,
            anchor_key = anchor.key_or_default(),
            anchor_bpm = anchor.bpm_or_default(),
            fetched,
            ranked = ranked.len(),
            "recommendation cycle complete"
        );
        ranked
    }
}
