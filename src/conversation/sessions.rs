//! Session registry: one isolated conversation per session id

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Mint a fresh opaque session id
#[must_use]
pub fn mint_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Concurrent map of session id to its conversation, created on first use
///
/// Each conversation sits behind its own lock, so one session's turn never
/// blocks another session's, and a turn within a session runs to completion
/// before the next one starts.
pub struct SessionRegistry<C> {
    sessions: RwLock<HashMap<String, Arc<Mutex<C>>>>,
    make: Box<dyn Fn() -> C + Send + Sync>,
}

impl<C> SessionRegistry<C> {
    /// Create a registry whose conversations are built by `make`
    #[must_use]
    pub fn new(make: impl Fn() -> C + Send + Sync + 'static) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            make: Box::new(make),
        }
    }

    /// Get the conversation for a session, creating it on first use
    pub async fn find_or_create(&self, session_id: &str) -> Arc<Mutex<C>> {
        if let Some(existing) = self.sessions.read().await.get(session_id) {
            return Arc::clone(existing);
        }

        let mut sessions = self.sessions.write().await;
        // A racing creator may have inserted while we waited for the write lock.
        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session = %session_id, "creating session");
                Arc::new(Mutex::new((self.make)()))
            });
        Arc::clone(entry)
    }

    /// Drop a session entirely; returns whether it existed
    pub async fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id).is_some();
        if removed {
            tracing::debug!(session = %session_id, "session removed");
        }
        removed
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
