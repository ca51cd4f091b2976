use std::time::Duration;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contacts::repo::ContactStore;
use crate::session::store::{Session, SessionStore};
use crate::storage::StorageError;

/// Moves contacts between the durable store and session state. Sessions are
/// hydrated at login and only written back on explicit save or logout. A
/// session that outlives `ttl` is discarded without a flush.
#[derive(Debug)]
pub struct SessionReconciler {
    contacts: ContactStore,
    sessions: SessionStore,
}

impl SessionReconciler {
    pub fn new(contacts: ContactStore, ttl: Duration) -> Self {
        Self {
            contacts,
            sessions: SessionStore::new(ttl),
        }
    }

    /// Hydrate a new session for `username` and return its id.
    #[instrument(skip(self))]
    pub async fn on_login(&self, username: &str) -> Result<Uuid, StorageError> {
        let contacts = self.contacts.load(username).await?;
        let count = contacts.len();
        let id = self
            .sessions
            .insert(Session::new(username.to_string(), contacts))
            .await;
        info!(session_id = %id, count, "session hydrated");
        Ok(id)
    }

    /// Take the session out, then flush it. Writes racing with logout find no
    /// session. A failed flush puts the session back so nothing is lost.
    #[instrument(skip(self))]
    pub async fn on_logout(&self, id: Uuid) -> Result<(), StorageError> {
        let Some(session) = self.sessions.remove(id).await else {
            debug!(session_id = %id, "logout without session");
            return Ok(());
        };
        if let Err(e) = self.contacts.save(&session.username, &session.contacts).await {
            warn!(session_id = %id, error = %e, "flush on logout failed, keeping session");
            self.sessions.restore(id, session).await;
            return Err(e);
        }
        info!(session_id = %id, "session cleared");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn on_explicit_save(&self, id: Uuid) -> Result<(), StorageError> {
        self.flush(id).await.map(|_| ())
    }

    /// Returns whether there was a session to flush.
    async fn flush(&self, id: Uuid) -> Result<bool, StorageError> {
        let Some((username, contacts)) = self
            .sessions
            .read(id, |s| (s.username.clone(), s.contacts.clone()))
            .await
        else {
            return Ok(false);
        };
        self.contacts.save(&username, &contacts).await?;
        Ok(true)
    }

    pub async fn is_active(&self, id: Uuid) -> bool {
        self.sessions.contains(id).await
    }

    pub async fn read<R>(&self, id: Uuid, f: impl FnOnce(&Session) -> R) -> Option<R> {
        self.sessions.read(id, f).await
    }

    pub async fn write<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        self.sessions.write(id, f).await
    }

    pub async fn set_message(&self, id: Uuid, message: impl Into<String>) {
        let message = message.into();
        self.sessions.write(id, |s| s.message = Some(message)).await;
    }

    /// Flash semantics: the message is returned once.
    pub async fn take_message(&self, id: Uuid) -> Option<String> {
        self.sessions.write(id, |s| s.message.take()).await.flatten()
    }
}
