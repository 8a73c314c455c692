//! Named-blob storage backends.
//!
//! The credential store only ever needs three operations from its medium:
//! load bytes under a name, save bytes under a name, and check existence.
//! Everything below that - directories, files, flash sectors - is the
//! backend's concern.

use crate::error::{StoreError, StoreResult};
use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;

/// Byte-level persistence seam consumed by the credential store.
///
/// Operations are synchronous: payloads are small (a full credential
/// sequence) and bounded, so blocking here is acceptable inside the
/// cooperative control loop.
pub trait StorageBackend: Send {
    /// Read the blob stored under `name`, or `None` if it does not exist.
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if the medium cannot be read.
    fn load(&self, name: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write `bytes` under `name`, replacing any previous content.
    ///
    /// # Errors
    /// Returns `StoreError::PersistFailed` if the write cannot complete.
    fn save(&mut self, name: &str, bytes: &[u8]) -> StoreResult<()>;

    /// Check whether a blob exists under `name`.
    fn exists(&self, name: &str) -> bool;
}

/// Directory-backed [`StorageBackend`]: one file per blob name.
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| StoreError::Unavailable(format!("cannot create {}: {e}", root.display())))?;
        Ok(Self { root })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl StorageBackend for FileBackend {
    fn load(&self, name: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.path_for(name);
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Unavailable(format!(
                    "cannot open {}: {e}",
                    path.display()
                )));
            }
        };

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| StoreError::Unavailable(format!("cannot read {}: {e}", path.display())))?;
        Ok(Some(bytes))
    }

    fn save(&mut self, name: &str, bytes: &[u8]) -> StoreResult<()> {
        let path = self.path_for(name);
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&path)?;
            file.write_all(bytes)?;
            file.flush()?;
            Ok(())
        };
        write()
            .map_err(|e| StoreError::PersistFailed(format!("cannot write {}: {e}", path.display())))
    }

    fn exists(&self, name: &str) -> bool {
        self.path_for(name).exists()
    }
}

/// In-memory [`StorageBackend`] for tests, with failure injection and a
/// persist-call counter.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    blobs: HashMap<String, Vec<u8>>,
    fail_saves: bool,
    save_calls: usize,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a blob (e.g., malformed content for load tests).
    #[must_use]
    pub fn with_blob(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.blobs.insert(name.to_string(), bytes);
        self
    }

    /// Make every subsequent save fail.
    pub fn fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Number of save calls attempted (including failed ones).
    #[must_use]
    pub fn save_calls(&self) -> usize {
        self.save_calls
    }

    /// Raw blob contents, for round-trip assertions.
    #[must_use]
    pub fn blob(&self, name: &str) -> Option<&[u8]> {
        self.blobs.get(name).map(Vec::as_slice)
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self, name: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.blobs.get(name).cloned())
    }

    fn save(&mut self, name: &str, bytes: &[u8]) -> StoreResult<()> {
        self.save_calls += 1;
        if self.fail_saves {
            return Err(StoreError::PersistFailed("injected failure".to_string()));
        }
        self.blobs.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.blobs.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path()).unwrap();

        assert!(!backend.exists("blob"));
        assert_eq!(backend.load("blob").unwrap(), None);

        backend.save("blob", b"payload").unwrap();
        assert!(backend.exists("blob"));
        assert_eq!(backend.load("blob").unwrap().unwrap(), b"payload");
    }

    #[test]
    fn test_file_backend_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path()).unwrap();

        backend.save("blob", b"first").unwrap();
        backend.save("blob", b"second").unwrap();
        assert_eq!(backend.load("blob").unwrap().unwrap(), b"second");
    }

    #[test]
    fn test_memory_backend_failure_injection() {
        let mut backend = MemoryBackend::new();
        backend.save("blob", b"ok").unwrap();

        backend.fail_saves(true);
        assert!(matches!(
            backend.save("blob", b"nope"),
            Err(StoreError::PersistFailed(_))
        ));
        // Failed save left the old content in place.
        assert_eq!(backend.blob("blob").unwrap(), b"ok");
        assert_eq!(backend.save_calls(), 2);
    }
}
