use deadbolt_core::{CredentialToken, Role};
use serde::{Deserialize, Serialize};

/// A single authorized credential.
///
/// Duplicate `token` values are prevented by construction - the write path
/// checks existence before appending. Multiple `Master` records are
/// structurally permitted; nothing in the record model enforces role
/// uniqueness, matching the permissiveness of the original device behavior
/// (normal enrollment only ever writes `User`, so a second master can only
/// appear via an external bulk load).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Digest token identifying the credential (hex in the persisted form).
    pub token: CredentialToken,

    /// Role assigned to the credential.
    pub role: Role,
}

impl CredentialRecord {
    /// Create a record.
    #[must_use]
    pub fn new(token: CredentialToken, role: Role) -> Self {
        Self { token, role }
    }

    /// Returns `true` for master records.
    #[inline]
    #[must_use]
    pub fn is_master(&self) -> bool {
        self.role.is_master()
    }
}
