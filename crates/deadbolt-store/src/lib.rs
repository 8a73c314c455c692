//! Durable credential record store for the deadbolt controller.
//!
//! The store is a flat, ordered sequence of `{token, role}` records loaded
//! once at startup and persisted in full on every mutation - there is no
//! partial or incremental persistence. Persistence goes through the
//! [`StorageBackend`] seam (load/save/exists of a named byte blob), which
//! keeps the byte-level medium out of the store's concern and makes the
//! store trivially testable.
//!
//! # Failure policy
//!
//! Loading fails soft: an absent blob means an empty store (persisted
//! immediately), a malformed blob is treated as empty with a logged warning,
//! and an unreadable medium leaves the store empty but operational. Write
//! failures are surfaced as [`StoreError`] values and never panic; `add` and
//! `remove` roll the in-memory change back so memory and disk agree after
//! every completed call, while `remove_where` keeps the in-memory removal
//! (the degraded state is accepted and reported).
//!
//! # Examples
//!
//! ```
//! use deadbolt_core::{Role, Sha256Digest, TokenDigest};
//! use deadbolt_store::{CredentialStore, MemoryBackend};
//!
//! let digest = Sha256Digest;
//! let token = digest.digest(&[0x04, 0xab, 0xcd, 0xef]);
//!
//! let mut store = CredentialStore::open(MemoryBackend::new(), "credentials.json");
//! store.add(token, Role::User).unwrap();
//!
//! assert_eq!(store.find(&token), Some(Role::User));
//! assert!(store.add(token, Role::User).is_err()); // duplicate
//! ```

pub mod backend;
pub mod error;
pub mod records;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use error::{StoreError, StoreResult};
pub use records::CredentialRecord;
pub use store::CredentialStore;
