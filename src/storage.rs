use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("yaml error in {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn yaml(path: &Path, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Root of the flat-file layout. Every document is a whole YAML file that is
/// read in full and replaced in full.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// Reads a document, falling back to `T::default()` when the file is
    /// missing or empty.
    pub async fn read_yaml<T>(&self, path: &Path) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "document absent, using default");
                return Ok(T::default());
            }
            Err(e) => return Err(StorageError::io(path, e)),
        };
        if content.trim().is_empty() {
            return Ok(T::default());
        }
        serde_yaml::from_str(&content).map_err(|e| StorageError::yaml(path, e))
    }

    /// Replaces a document. The new content goes to a sibling temp file first
    /// and is renamed over the target, so readers never see a partial write.
    pub async fn write_yaml<T>(&self, path: &Path, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_yaml::to_string(value).map_err(|e| StorageError::yaml(path, e))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| StorageError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| StorageError::io(path, e))?;

        debug!(path = %path.display(), "document written");
        Ok(())
    }
}
