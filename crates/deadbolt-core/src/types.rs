use crate::{Result, constants::TOKEN_LENGTH, error::Error};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;

/// Opaque credential token (digest of a raw card identifier).
///
/// Tokens are the storage-safe representation of a scanned card: the raw
/// identifier bytes never leave the digest seam, only the fixed-length token
/// is stored and compared.
///
/// # Security
/// This type implements constant-time comparison to prevent timing attacks
/// when matching a scanned token against stored credentials.
#[derive(Debug, Clone, Copy, Eq)]
pub struct CredentialToken([u8; TOKEN_LENGTH]);

impl CredentialToken {
    /// Create a token from raw digest output.
    #[must_use]
    pub fn from_bytes(bytes: [u8; TOKEN_LENGTH]) -> Self {
        CredentialToken(bytes)
    }

    /// Get the token bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; TOKEN_LENGTH] {
        &self.0
    }

    /// Format the token as a lowercase hex string (the persisted form).
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a token from its hex representation.
    ///
    /// # Errors
    /// Returns `Error::InvalidTokenEncoding` if the input is not exactly
    /// 64 hex digits.
    pub fn parse_hex(s: &str) -> Result<Self> {
        if s.len() != TOKEN_LENGTH * 2 {
            return Err(Error::InvalidTokenEncoding(format!(
                "expected {} hex digits, got {}",
                TOKEN_LENGTH * 2,
                s.len()
            )));
        }
        let mut bytes = [0u8; TOKEN_LENGTH];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| Error::InvalidTokenEncoding("non-ASCII input".to_string()))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| Error::InvalidTokenEncoding(format!("invalid hex pair: {pair}")))?;
        }
        Ok(CredentialToken(bytes))
    }
}

impl fmt::Display for CredentialToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for CredentialToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CredentialToken::parse_hex(s)
    }
}

/// Constant-time comparison implementation for CredentialToken
///
/// This prevents timing attacks by ensuring comparison takes the same time
/// regardless of where the token bytes differ.
impl PartialEq for CredentialToken {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

/// Hash implementation for CredentialToken
///
/// Implements standard hashing for use in hash-based collections.
impl std::hash::Hash for CredentialToken {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Serialize for CredentialToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CredentialToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CredentialToken::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Credential role.
///
/// `Master` tokens toggle program mode and gate destructive operations;
/// `User` tokens open the door. Normal enrollment only ever writes `User` -
/// the master credential is written once, at first boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Master,
    User,
}

impl Role {
    /// Returns `true` for the master role.
    #[inline]
    #[must_use]
    pub fn is_master(self) -> bool {
        matches!(self, Role::Master)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Master => write!(f, "master"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Controller access mode.
///
/// Starts `Normal`. Mutated only by the access state machine when a master
/// token is scanned; in `Program` mode scans enroll or revoke user
/// credentials instead of granting or denying access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    Normal,
    Program,
}

impl AccessMode {
    /// Returns `true` while enrollment mode is active.
    #[inline]
    #[must_use]
    pub fn is_program(self) -> bool {
        matches!(self, AccessMode::Program)
    }

    /// The opposite mode (master scans flip between the two).
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            AccessMode::Normal => AccessMode::Program,
            AccessMode::Program => AccessMode::Normal,
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AccessMode::Normal => write!(f, "normal"),
            AccessMode::Program => write!(f, "program"),
        }
    }
}

/// Classification of a scanned token against the credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No record for this token.
    Unknown,

    /// A record with `Role::User`.
    KnownUser,

    /// A record with `Role::Master`.
    KnownMaster,
}

impl From<Option<Role>> for Classification {
    fn from(role: Option<Role>) -> Self {
        match role {
            None => Classification::Unknown,
            Some(Role::User) => Classification::KnownUser,
            Some(Role::Master) => Classification::KnownMaster,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Classification::Unknown => write!(f, "unknown"),
            Classification::KnownUser => write!(f, "known user"),
            Classification::KnownMaster => write!(f, "known master"),
        }
    }
}

/// Abstract feedback events rendered by the output driver.
///
/// Each event maps to a fixed, deterministic sequence of indicator, alarm
/// and lock steps. `ReaderFault` is the one terminal event: its sequence
/// repeats forever once entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackEvent {
    /// Quiescent state: indicator on standby, lock engaged, alarm off.
    Idle,

    /// Blocking boot state: no master credential defined yet.
    WaitingEnrollMaster,

    /// A master credential exists; controller is entering normal service.
    MasterDefinedReady,

    /// Enrollment mode entered (master scan in normal mode).
    ProgramEntered,

    /// Enrollment mode exited (master scan in program mode).
    ProgramExited,

    /// Access granted: lock releases for the configured hold duration.
    Granted,

    /// Access denied.
    Denied,

    /// A credential record was written.
    WriteSuccess,

    /// A credential record was removed.
    DeleteSuccess,

    /// A store mutation failed (duplicate or persist failure).
    WriteFailed,

    /// Wipe trigger detected held; confirmation window running.
    WipeArmed,

    /// Wipe trigger released before the window elapsed.
    WipeCancelled,

    /// Reader identification failed at boot. Terminal.
    ReaderFault,
}

impl fmt::Display for FeedbackEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            FeedbackEvent::Idle => "idle",
            FeedbackEvent::WaitingEnrollMaster => "waiting_enroll_master",
            FeedbackEvent::MasterDefinedReady => "master_defined_ready",
            FeedbackEvent::ProgramEntered => "program_entered",
            FeedbackEvent::ProgramExited => "program_exited",
            FeedbackEvent::Granted => "granted",
            FeedbackEvent::Denied => "denied",
            FeedbackEvent::WriteSuccess => "write_success",
            FeedbackEvent::DeleteSuccess => "delete_success",
            FeedbackEvent::WriteFailed => "write_failed",
            FeedbackEvent::WipeArmed => "wipe_armed",
            FeedbackEvent::WipeCancelled => "wipe_cancelled",
            FeedbackEvent::ReaderFault => "reader_fault",
        };
        write!(f, "{name}")
    }
}
