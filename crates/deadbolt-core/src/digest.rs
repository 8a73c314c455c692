//! Credential digest seam.
//!
//! Raw card identifiers are hashed before storage so the persisted record
//! collection never contains transport identifiers. The controller only ever
//! sees the fixed-length [`CredentialToken`]; the digest input length is
//! whatever the reader produced (4 bytes on the observed hardware, but
//! nothing here assumes that).

use crate::types::CredentialToken;
use sha2::{Digest, Sha256};

/// Maps a raw card identifier to an opaque fixed-length token.
pub trait TokenDigest {
    /// Digest the raw identifier bytes into a storage token.
    fn digest(&self, raw: &[u8]) -> CredentialToken;
}

/// SHA-256 backed [`TokenDigest`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl TokenDigest for Sha256Digest {
    fn digest(&self, raw: &[u8]) -> CredentialToken {
        let mut hasher = Sha256::new();
        hasher.update(raw);
        CredentialToken::from_bytes(hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let d = Sha256Digest;
        assert_eq!(d.digest(&[0x04, 0xab, 0xcd, 0xef]), d.digest(&[0x04, 0xab, 0xcd, 0xef]));
    }

    #[test]
    fn test_digest_distinguishes_inputs() {
        let d = Sha256Digest;
        assert_ne!(d.digest(&[0x01, 0x02, 0x03, 0x04]), d.digest(&[0x01, 0x02, 0x03, 0x05]));
    }

    #[test]
    fn test_digest_accepts_any_length() {
        let d = Sha256Digest;
        // 4-byte and 7-byte UIDs both digest to full-length tokens.
        let short = d.digest(&[0x04; 4]);
        let long = d.digest(&[0x04; 7]);
        assert_ne!(short, long);
        assert_eq!(short.to_hex().len(), 64);
    }

    #[test]
    fn test_digest_known_vector() {
        // SHA-256 of the empty input.
        let d = Sha256Digest;
        assert_eq!(
            d.digest(&[]).to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
