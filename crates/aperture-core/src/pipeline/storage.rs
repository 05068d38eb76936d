//! Append-only artifact storage for uploads and thumbnails.

use std::fs::OpenOptions;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Key-addressed storage the pipeline writes artifacts into.
///
/// Keys are never reused: `put` refuses to overwrite an existing artifact.
pub trait ArtifactStore: Send + Sync {
    /// Persist `bytes` under `key`.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Read back the artifact stored under `key`.
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Filesystem location of `key`, if the store is file-backed.
    fn path_of(&self, key: &str) -> Result<PathBuf, StoreError>;
}

/// Stores each artifact as a flat file under a root directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keys are single path components.
    fn check_key(key: &str) -> Result<(), StoreError> {
        let bad = key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\', '\0'])
            || Path::new(key).is_absolute();
        if bad {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(())
    }
}

impl ArtifactStore for LocalStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_of(key)?;
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(io_err)?;
        file.write_all(bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;

        tracing::trace!("Stored {} bytes at {:?}", bytes.len(), path);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_of(key)?;
        std::fs::read(&path).map_err(|source| {
            if source.kind() == IoErrorKind::NotFound {
                StoreError::NotFound(key.to_string())
            } else {
                StoreError::Io {
                    key: key.to_string(),
                    source,
                }
            }
        })
    }

    fn path_of(&self, key: &str) -> Result<PathBuf, StoreError> {
        Self::check_key(key)?;
        Ok(self.root.join(key))
    }
}
