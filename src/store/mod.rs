//! Session store
//!
//! Explicit repository owning all set sessions, plus the per-user locks
//! that serialize commit/recommend for one user. Reads hand out cloned
//! snapshots and mutations replace the whole record, so a concurrent
//! reader never observes a partially applied commit. Cross-user operations
//! only contend on the brief map locks.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::models::SetSession;

/// Session repository
///
/// The in-memory implementation below is the only one in the service;
/// the trait is the seam a persistent backing store would plug into.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Snapshot of the user's session, if one was started
    async fn get(&self, user_id: &str) -> Option<SetSession>;

    /// Insert or replace the user's session as one atomic swap
    async fn put(&self, session: SetSession);

    /// Drop the user's session
    async fn delete(&self, user_id: &str);
}

/// Process-held session table, one record per user
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SetSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for MemorySessionStore {
    async fn get(&self, user_id: &str) -> Option<SetSession> {
        self.sessions.read().await.get(user_id).cloned()
    }

    async fn put(&self, session: SetSession) {
        self.sessions
            .write()
            .await
            .insert(session.user_id.clone(), session);
    }

    async fn delete(&self, user_id: &str) {
        self.sessions.write().await.remove(user_id);
    }
}

/// Per-user mutual exclusion for session mutations
///
/// At most one in-flight commit/recommend per user; the guard is held
/// across the whole critical section including the catalog call.
#[derive(Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(user_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}
