use std::path::PathBuf;

use tracing::info;

use crate::contacts::model::Contact;
use crate::storage::{DataDir, StorageError};

/// Per-user contact files under `<data_dir>/contacts/<username>.yml`.
#[derive(Debug, Clone)]
pub struct ContactStore {
    data: DataDir,
}

impl ContactStore {
    pub fn new(data: DataDir) -> Self {
        Self { data }
    }

    fn path_for(&self, username: &str) -> PathBuf {
        self.data.path("contacts").join(format!("{username}.yml"))
    }

    /// Load a user's contacts; empty when the user has never saved.
    pub async fn load(&self, username: &str) -> Result<Vec<Contact>, StorageError> {
        self.data.read_yaml(&self.path_for(username)).await
    }

    /// Overwrite a user's contact file with `contacts`.
    pub async fn save(&self, username: &str, contacts: &[Contact]) -> Result<(), StorageError> {
        self.data.write_yaml(&self.path_for(username), contacts).await?;
        info!(%username, count = contacts.len(), "contacts saved");
        Ok(())
    }
}

/// One past the highest uid in the collection, or 1 when it is empty.
pub fn next_uid(contacts: &[Contact]) -> u64 {
    contacts.iter().map(|c| c.uid).max().map_or(1, |max| max + 1)
}
