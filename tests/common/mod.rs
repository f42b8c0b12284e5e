//! Shared test fixtures: a scriptable stub catalog and builders
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use cuedeck::models::Track;
use cuedeck::services::{CatalogError, Recommender, RecommenderSettings, TrackCatalog};
use cuedeck::store::MemorySessionStore;

/// Track builder with explicit analysis metadata
pub fn track(id: &str, key: &str, bpm: u32) -> Track {
    Track {
        key: Some(key.to_string()),
        bpm: Some(bpm),
        ..Track::stub(id)
    }
}

/// Scriptable in-memory catalog
///
/// `honor_excludes = false` simulates an unfaithful provider that ignores
/// the exclusion list, exercising the recommender's defensive filtering.
#[derive(Default)]
pub struct StubCatalog {
    pub trending: Vec<Track>,
    pub pool: Vec<Track>,
    pub details: HashMap<String, Track>,
    pub honor_excludes: bool,
    pub fail_candidates: bool,
    pub fail_details: bool,
    pub candidate_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

impl StubCatalog {
    pub fn new() -> Self {
        Self {
            honor_excludes: true,
            ..Self::default()
        }
    }

    pub fn with_trending(mut self, tracks: Vec<Track>) -> Self {
        self.trending = tracks;
        self
    }

    pub fn with_pool(mut self, tracks: Vec<Track>) -> Self {
        self.pool = tracks;
        self
    }

    pub fn with_detail(mut self, detail: Track) -> Self {
        self.details.insert(detail.id.clone(), detail);
        self
    }

    pub fn ignoring_excludes(mut self) -> Self {
        self.honor_excludes = false;
        self
    }

    pub fn failing_candidates(mut self) -> Self {
        self.fail_candidates = true;
        self
    }

    pub fn failing_details(mut self) -> Self {
        self.fail_details = true;
        self
    }
}

#[async_trait]
impl TrackCatalog for StubCatalog {
    async fn fetch_candidates(
        &self,
        _genre: &str,
        _country: &str,
        exclude_ids: &HashSet<String>,
    ) -> Result<Vec<Track>, CatalogError> {
        self.candidate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_candidates {
            return Err(CatalogError::Network("stub outage".to_string()));
        }
        let pool = self.pool.clone();
        Ok(if self.honor_excludes {
            pool.into_iter()
                .filter(|t| !exclude_ids.contains(&t.id))
                .collect()
        } else {
            pool
        })
    }

    async fn fetch_trending(
        &self,
        _genre: &str,
        _country: &str,
    ) -> Result<Vec<Track>, CatalogError> {
        Ok(self.trending.clone())
    }

    async fn resolve_detail(&self, track_id: &str) -> Result<Option<Track>, CatalogError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_details {
            return Err(CatalogError::Network("stub outage".to_string()));
        }
        Ok(self.details.get(track_id).cloned())
    }
}

/// Recommender over an in-memory store and the given stub, with a retry
/// delay short enough for tests
pub fn recommender_with(catalog: Arc<StubCatalog>) -> Recommender {
    Recommender::new(
        Arc::new(MemorySessionStore::new()),
        catalog,
        RecommenderSettings {
            retry_delay: Duration::from_millis(1),
            ..RecommenderSettings::default()
        },
    )
}
