//! Track catalog boundary
//!
//! The catalog is the external source of track metadata: fresh candidate
//! pools, trending seeds for a scope, and per-track detail. The service
//! talks to it only through this trait so tests can substitute a stub.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Track;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// External provider of track metadata
///
/// Implementations must return tracks annotated with at least `id`;
/// `key`/`bpm` may be absent when the provider cannot supply real values
/// (readers default them). `fetch_candidates` is expected to honor
/// `exclude_ids`, but callers filter defensively by id regardless.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Fresh candidate pool scoped to genre/country
    async fn fetch_candidates(
        &self,
        genre: &str,
        country: &str,
        exclude_ids: &HashSet<String>,
    ) -> Result<Vec<Track>, CatalogError>;

    /// Trending tracks for a scope, used to seed a new session
    async fn fetch_trending(&self, genre: &str, country: &str)
        -> Result<Vec<Track>, CatalogError>;

    /// Full metadata for one track id; `Ok(None)` when the catalog does
    /// not know the track
    async fn resolve_detail(&self, track_id: &str) -> Result<Option<Track>, CatalogError>;
}

/// Run a catalog call, retrying once after a fixed short delay
///
/// The single retry is the only retry in the system; callers degrade the
/// second failure to an empty result rather than propagating it.
pub async fn with_retry<T, F, Fut>(
    operation: &str,
    retry_delay: Duration,
    mut call: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    match call().await {
        Ok(value) => Ok(value),
        Err(first) => {
            tracing::warn!(
                operation,
                error = %first,
                retry_delay_ms = retry_delay.as_millis() as u64,
                "catalog call failed, retrying once"
            );
            tokio::time::sleep(retry_delay).await;
            call().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn first_success_does_not_retry() {
        let calls = AtomicUsize::new(0);
        let result = with_retry("op", Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, CatalogError>(7) }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_exactly_once_then_succeeds() {
        let calls = AtomicUsize::new(0);
        let result = with_retry("op", Duration::from_millis(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(CatalogError::Network("connection reset".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_failure_is_returned() {
        let calls = AtomicUsize::new(0);
        let result: Result<i32, _> = with_retry("op", Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(CatalogError::Network("down".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
