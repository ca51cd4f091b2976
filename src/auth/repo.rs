use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::auth::services::{hash_password, verify_password};
use crate::storage::{DataDir, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("username {0} is already taken")]
    UsernameTaken(String),
    #[error("username {0:?} contains path characters")]
    InvalidUsername(String),
    #[error("password hash error: {0}")]
    Hash(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Usernames double as file names for the contact store.
pub fn is_safe_username(username: &str) -> bool {
    !username.is_empty()
        && !username.starts_with('.')
        && !username.contains(&['/', '\\', '\0'][..])
}

/// The `users.yml` mapping of username to Argon2 PHC hash.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    data: DataDir,
}

impl CredentialStore {
    pub fn new(data: DataDir) -> Self {
        Self { data }
    }

    fn path(&self) -> PathBuf {
        self.data.path("users.yml")
    }

    pub async fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        self.data.read_yaml(&self.path()).await
    }

    pub async fn exists(&self, username: &str) -> Result<bool, StorageError> {
        Ok(self.load().await?.contains_key(username))
    }

    /// Hash `password` and add the user, rewriting the whole file.
    pub async fn create(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        if !is_safe_username(username) {
            return Err(CredentialError::InvalidUsername(username.to_string()));
        }

        let mut users = self.load().await?;
        if users.contains_key(username) {
            warn!(%username, "username already registered");
            return Err(CredentialError::UsernameTaken(username.to_string()));
        }

        let hash = hash_password(password).map_err(|e| CredentialError::Hash(e.to_string()))?;
        users.insert(username.to_string(), hash);
        self.data.write_yaml(&self.path(), &users).await?;

        info!(%username, "user created");
        Ok(())
    }

    /// False for unknown users; otherwise the Argon2 verdict.
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        let users = self.load().await?;
        let Some(hash) = users.get(username) else {
            return Ok(false);
        };
        verify_password(password, hash).map_err(|e| CredentialError::Hash(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(DataDir::new(dir.path()));
        (dir, store)
    }

    #[tokio::test]
    async fn load_without_file_is_empty() {
        let (_dir, store) = store();
        assert!(store.load().await.unwrap().is_empty());
        assert!(!store.exists("admin").await.unwrap());
    }

    #[tokio::test]
    async fn create_then_verify() {
        let (_dir, store) = store();
        store.create("admin", "secret").await.unwrap();

        assert!(store.exists("admin").await.unwrap());
        assert!(store.verify("admin", "secret").await.unwrap());
        assert!(!store.verify("admin", "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn stored_hash_is_salted_not_plaintext() {
        let (_dir, store) = store();
        store.create("admin", "secret").await.unwrap();
        store.create("root", "secret").await.unwrap();

        let users = store.load().await.unwrap();
        assert!(users["admin"].starts_with("$argon2"));
        assert_ne!(users["admin"], users["root"]);
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let (_dir, store) = store();
        store.create("admin", "secret").await.unwrap();
        assert!(!store.exists("Admin").await.unwrap());
        assert!(!store.verify("Admin", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (_dir, store) = store();
        store.create("admin", "secret").await.unwrap();
        let err = store.create("admin", "other").await.unwrap_err();
        assert!(matches!(err, CredentialError::UsernameTaken(_)));
        assert!(store.verify("admin", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_user_does_not_verify() {
        let (_dir, store) = store();
        assert!(!store.verify("ghost", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn path_like_usernames_are_refused() {
        let (_dir, store) = store();
        for name in ["../etc", "a/b", ".hidden", "a\\b"] {
            let err = store.create(name, "pw").await.unwrap_err();
            assert!(matches!(err, CredentialError::InvalidUsername(_)), "{name}");
        }
    }

    #[tokio::test]
    async fn malformed_stored_hash_is_an_error() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("users.yml"), "admin: not-a-hash\n").unwrap();
        assert!(matches!(
            store.verify("admin", "secret").await,
            Err(CredentialError::Hash(_))
        ));
    }
}
