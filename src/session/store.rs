use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::contacts::model::Contact;

/// Transient state of one logged-in connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub contacts: Vec<Contact>,
    pub message: Option<String>,
}

impl Session {
    pub fn new(username: String, contacts: Vec<Contact>) -> Self {
        Self {
            username,
            contacts,
            message: None,
        }
    }
}

struct Entry {
    session: Session,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-process session table keyed by the id carried in the session token.
/// Entries live for `ttl`, matching the token lifetime; expired entries are
/// invisible to lookups and are purged on every insert.
/// Closures passed to [`SessionStore::read`] and [`SessionStore::write`] run
/// under the lock and must not block.
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, session: Session) -> Uuid {
        let id = Uuid::new_v4();
        self.put(id, session).await;
        id
    }

    /// Put a session back under an existing id, e.g. after a failed flush.
    pub async fn restore(&self, id: Uuid, session: Session) {
        self.put(id, session).await;
    }

    async fn put(&self, id: Uuid, session: Session) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.is_live(now));
        let purged = before - sessions.len();
        if purged > 0 {
            debug!(purged, "expired sessions purged");
        }
        sessions.insert(
            id,
            Entry {
                session,
                expires_at: now + self.ttl,
            },
        );
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .get(&id)
            .is_some_and(|e| e.is_live(now))
    }

    pub async fn read<R>(&self, id: Uuid, f: impl FnOnce(&Session) -> R) -> Option<R> {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|e| e.is_live(now))
            .map(|e| f(&e.session))
    }

    pub async fn write<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let now = Instant::now();
        self.sessions
            .write()
            .await
            .get_mut(&id)
            .filter(|e| e.is_live(now))
            .map(|e| f(&mut e.session))
    }

    /// Remove and return a live session. An expired entry is dropped and
    /// reported as absent.
    pub async fn remove(&self, id: Uuid) -> Option<Session> {
        let now = Instant::now();
        self.sessions
            .write()
            .await
            .remove(&id)
            .filter(|e| e.is_live(now))
            .map(|e| e.session)
    }

    #[cfg(test)]
    pub(crate) async fn stored(&self) -> usize {
        self.sessions.read().await.len()
    }
}
