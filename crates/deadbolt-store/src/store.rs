//! The credential store proper.

use crate::backend::StorageBackend;
use crate::error::{StoreError, StoreResult};
use crate::records::CredentialRecord;
use deadbolt_core::{CredentialToken, Role};
use tracing::{info, warn};

/// Durable mapping of credential token to role.
///
/// The full record sequence lives in memory (insertion order preserved) and
/// is written back through the backend on every mutation. There are no
/// concurrent mutators: the store is exclusively owned by the controller
/// task.
pub struct CredentialStore<B: StorageBackend> {
    backend: B,
    name: String,
    records: Vec<CredentialRecord>,
}

impl<B: StorageBackend> CredentialStore<B> {
    /// Load the store from the backend.
    ///
    /// Fails soft in every case:
    /// - absent blob: starts empty and persists the empty sequence
    ///   immediately, so the blob exists from first boot on;
    /// - malformed blob: treated as empty, warning logged;
    /// - unreadable medium: starts empty, degraded but operational.
    pub fn open(backend: B, name: impl Into<String>) -> Self {
        let name = name.into();
        let mut store = Self {
            backend,
            name,
            records: Vec::new(),
        };

        match store.backend.load(&store.name) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<CredentialRecord>>(&bytes) {
                Ok(records) => {
                    info!(count = records.len(), blob = %store.name, "credential store loaded");
                    store.records = records;
                }
                Err(e) => {
                    warn!(blob = %store.name, error = %e, "malformed credential blob, starting empty");
                }
            },
            Ok(None) => {
                info!(blob = %store.name, "no credential blob, initializing empty store");
                if let Err(e) = store.persist() {
                    warn!(blob = %store.name, error = %e, "could not persist initial empty store");
                }
            }
            Err(e) => {
                warn!(blob = %store.name, error = %e, "storage unavailable, continuing with empty store");
            }
        }

        store
    }

    /// Look up the role stored for a token.
    ///
    /// Linear scan returning the first match - deterministic because
    /// duplicate tokens are prevented by the write path.
    #[must_use]
    pub fn find(&self, token: &CredentialToken) -> Option<Role> {
        self.records
            .iter()
            .find(|r| r.token == *token)
            .map(|r| r.role)
    }

    /// Add a credential.
    ///
    /// Appends and persists the full sequence synchronously. If persistence
    /// fails, the in-memory append is rolled back so memory and disk agree
    /// after every completed call.
    ///
    /// # Errors
    /// - `StoreError::Duplicate` if a record for the token already exists.
    /// - `StoreError::PersistFailed` if the sequence could not be flushed.
    pub fn add(&mut self, token: CredentialToken, role: Role) -> StoreResult<()> {
        if self.find(&token).is_some() {
            return Err(StoreError::Duplicate);
        }

        self.records.push(CredentialRecord::new(token, role));
        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }

        info!(token = %token, %role, "credential added");
        Ok(())
    }

    /// Remove the record for a token.
    ///
    /// Returns whether a record was removed. Absent tokens are a no-op: no
    /// persist happens and `Ok(false)` is returned. On persist failure the
    /// record is reinserted at its original index.
    ///
    /// # Errors
    /// Returns `StoreError::PersistFailed` if the flush after removal fails.
    pub fn remove(&mut self, token: &CredentialToken) -> StoreResult<bool> {
        let Some(index) = self.records.iter().position(|r| r.token == *token) else {
            return Ok(false);
        };

        let record = self.records.remove(index);
        if let Err(e) = self.persist() {
            self.records.insert(index, record);
            return Err(e);
        }

        info!(token = %token, "credential removed");
        Ok(true)
    }

    /// Bulk-remove all records matching the predicate.
    ///
    /// Uses retain (no removal while iterating) and persists exactly once
    /// per call, whatever the match count - including zero - so the visible
    /// on-disk state changes atomically across a wipe. On persist failure
    /// the in-memory removal is kept: memory and disk may now disagree,
    /// which is the accepted degraded outcome of a failed wipe flush.
    ///
    /// # Errors
    /// Returns `StoreError::PersistFailed` if the single flush fails.
    pub fn remove_where<F>(&mut self, predicate: F) -> StoreResult<usize>
    where
        F: Fn(&CredentialRecord) -> bool,
    {
        let before = self.records.len();
        self.records.retain(|r| !predicate(r));
        let removed = before - self.records.len();

        self.persist()?;

        info!(removed, remaining = self.records.len(), "bulk removal persisted");
        Ok(removed)
    }

    /// Check whether any record carries the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.records.iter().any(|r| r.role == role)
    }

    /// Write the first master credential.
    ///
    /// The boot-enrollment path: called only while no master is defined, it
    /// appends a `Master` record without running the duplicate check that
    /// `add` performs. Persist-failure rollback applies as for `add`.
    ///
    /// # Errors
    /// Returns `StoreError::PersistFailed` if the flush fails.
    pub fn enroll_master(&mut self, token: CredentialToken) -> StoreResult<()> {
        self.records.push(CredentialRecord::new(token, Role::Master));
        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }

        info!(token = %token, "master credential enrolled");
        Ok(())
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record sequence, in insertion order.
    #[must_use]
    pub fn records(&self) -> &[CredentialRecord] {
        &self.records
    }

    /// The backing storage (test inspection).
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backing storage (failure injection in tests).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn persist(&mut self) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(&self.records)
            .map_err(|e| StoreError::PersistFailed(format!("cannot encode records: {e}")))?;
        self.backend.save(&self.name, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use deadbolt_core::{Sha256Digest, TokenDigest};
    use rstest::rstest;

    const BLOB: &str = "credentials.json";

    fn token(seed: u8) -> CredentialToken {
        Sha256Digest.digest(&[seed; 4])
    }

    fn open_empty() -> CredentialStore<MemoryBackend> {
        CredentialStore::open(MemoryBackend::new(), BLOB)
    }

    #[test]
    fn test_open_absent_initializes_and_persists_empty() {
        let store = open_empty();
        assert!(store.is_empty());
        // The empty sequence was written immediately.
        assert!(store.backend().exists(BLOB));
        assert_eq!(store.backend().save_calls(), 1);
    }

    #[test]
    fn test_open_malformed_blob_starts_empty() {
        let backend = MemoryBackend::new().with_blob(BLOB, b"not json at all".to_vec());
        let store = CredentialStore::open(backend, BLOB);
        assert!(store.is_empty());
        // Malformed content is not rewritten at load time.
        assert_eq!(store.backend().save_calls(), 0);
    }

    #[test]
    fn test_add_and_find() {
        let mut store = open_empty();
        store.add(token(1), Role::Master).unwrap();
        store.add(token(2), Role::User).unwrap();

        assert_eq!(store.find(&token(1)), Some(Role::Master));
        assert_eq!(store.find(&token(2)), Some(Role::User));
        assert_eq!(store.find(&token(3)), None);
    }

    #[test]
    fn test_duplicate_add_rejected_and_store_unchanged() {
        let mut store = open_empty();
        store.add(token(1), Role::User).unwrap();

        let err = store.add(token(1), Role::User).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
        // Exactly one record for the token after both calls.
        assert_eq!(store.len(), 1);

        // Duplicate detection is by token, not role.
        let err = store.add(token(1), Role::Master).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
    }

    #[test]
    fn test_add_rolls_back_on_persist_failure() {
        let mut store = open_empty();
        store.add(token(1), Role::User).unwrap();

        store.backend.fail_saves(true);
        let err = store.add(token(2), Role::User).unwrap_err();
        assert!(matches!(err, StoreError::PersistFailed(_)));

        // In-memory state rolled back to match disk.
        assert_eq!(store.len(), 1);
        assert_eq!(store.find(&token(2)), None);

        // Once the medium recovers the add goes through.
        store.backend.fail_saves(false);
        store.add(token(2), Role::User).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_remove_present_and_absent() {
        let mut store = open_empty();
        store.add(token(1), Role::User).unwrap();
        let saves_before = store.backend().save_calls();

        assert!(store.remove(&token(1)).unwrap());
        assert_eq!(store.find(&token(1)), None);
        assert_eq!(store.backend().save_calls(), saves_before + 1);

        // Absent token: no-op, no persist.
        assert!(!store.remove(&token(1)).unwrap());
        assert_eq!(store.backend().save_calls(), saves_before + 1);
    }

    #[test]
    fn test_remove_rolls_back_at_original_index() {
        let mut store = open_empty();
        store.add(token(1), Role::Master).unwrap();
        store.add(token(2), Role::User).unwrap();
        store.add(token(3), Role::User).unwrap();

        store.backend.fail_saves(true);
        let err = store.remove(&token(2)).unwrap_err();
        assert!(matches!(err, StoreError::PersistFailed(_)));

        // Record restored in its original position.
        let tokens: Vec<_> = store.records().iter().map(|r| r.token).collect();
        assert_eq!(tokens, vec![token(1), token(2), token(3)]);
    }

    #[rstest]
    #[case(Role::Master, 1, 2)]
    #[case(Role::User, 2, 1)]
    fn test_remove_where_by_role(
        #[case] target: Role,
        #[case] expected_removed: usize,
        #[case] expected_remaining: usize,
    ) {
        let mut store = open_empty();
        store.add(token(1), Role::Master).unwrap();
        store.add(token(2), Role::User).unwrap();
        store.add(token(3), Role::User).unwrap();

        let removed = store.remove_where(|r| r.role == target).unwrap();
        assert_eq!(removed, expected_removed);
        assert_eq!(store.len(), expected_remaining);
        assert!(!store.has_role(target));
    }

    #[test]
    fn test_remove_where_persists_exactly_once() {
        let mut store = open_empty();
        store.add(token(1), Role::Master).unwrap();
        store.add(token(2), Role::User).unwrap();
        store.add(token(3), Role::User).unwrap();
        let saves_before = store.backend().save_calls();

        store.remove_where(|r| r.role == Role::User).unwrap();
        assert_eq!(store.backend().save_calls(), saves_before + 1);

        // Zero matches still persists once.
        store.remove_where(|r| r.role == Role::User).unwrap();
        assert_eq!(store.backend().save_calls(), saves_before + 2);
    }

    #[test]
    fn test_remove_where_keeps_memory_on_persist_failure() {
        let mut store = open_empty();
        store.add(token(1), Role::Master).unwrap();
        store.add(token(2), Role::User).unwrap();

        store.backend.fail_saves(true);
        let err = store.remove_where(|r| r.role == Role::User).unwrap_err();
        assert!(matches!(err, StoreError::PersistFailed(_)));

        // The wipe stays applied in memory; only the flush was lost.
        assert_eq!(store.len(), 1);
        assert!(store.has_role(Role::Master));
        assert!(!store.has_role(Role::User));
    }

    #[test]
    fn test_has_role() {
        let mut store = open_empty();
        assert!(!store.has_role(Role::Master));

        store.add(token(1), Role::User).unwrap();
        assert!(!store.has_role(Role::Master));
        assert!(store.has_role(Role::User));

        store.add(token(2), Role::Master).unwrap();
        assert!(store.has_role(Role::Master));
    }

    #[test]
    fn test_enroll_master_skips_duplicate_check() {
        let mut store = open_empty();
        store.enroll_master(token(1)).unwrap();
        assert!(store.has_role(Role::Master));
        assert_eq!(store.find(&token(1)), Some(Role::Master));
    }

    #[test]
    fn test_enroll_master_rolls_back_on_persist_failure() {
        let mut store = open_empty();
        store.backend.fail_saves(true);

        assert!(store.enroll_master(token(1)).is_err());
        assert!(store.is_empty());
        assert!(!store.has_role(Role::Master));
    }

    #[test]
    fn test_multiple_master_records_permitted() {
        // Role uniqueness is deliberately not enforced; only token
        // uniqueness is.
        let mut store = open_empty();
        store.add(token(1), Role::Master).unwrap();
        store.add(token(2), Role::Master).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.has_role(Role::Master));
    }

    #[test]
    fn test_reload_reproduces_state() {
        let mut store = open_empty();
        store.add(token(1), Role::Master).unwrap();
        store.add(token(2), Role::User).unwrap();
        store.add(token(3), Role::User).unwrap();
        store.remove(&token(3)).unwrap();

        let bytes = store.backend().blob(BLOB).unwrap().to_vec();
        let reloaded = CredentialStore::open(MemoryBackend::new().with_blob(BLOB, bytes), BLOB);

        assert_eq!(reloaded.records(), store.records());
    }
}
