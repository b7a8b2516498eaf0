//! Expected checksums for source archives.
//!
//! A recipe stores the digest a fetched artifact must hash to; the
//! fetch step itself (and the hashing of downloaded bytes) lives in the
//! builder, not here. Digests are written as hex in recipe files and
//! compared for exact equality.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur when parsing a checksum digest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChecksumError {
    #[error("invalid {algorithm} digest '{digest}': expected {expected} hex characters")]
    WrongLength {
        algorithm: &'static str,
        digest: String,
        expected: usize,
    },

    #[error("invalid {algorithm} digest '{digest}': not a hex string")]
    NotHex {
        algorithm: &'static str,
        digest: String,
    },
}

/// An expected source-archive digest, tagged with its algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Checksum {
    /// 128-bit MD5 digest, as carried by older recipes.
    Md5([u8; 16]),
    /// 256-bit SHA-256 digest.
    Sha256([u8; 32]),
}

impl Checksum {
    /// Parse an MD5 digest from hex.
    ///
    /// # Errors
    ///
    /// Returns an error if the digest is not 32 hex characters.
    pub fn md5(digest: &str) -> Result<Self, ChecksumError> {
        decode::<16>("md5", digest).map(Self::Md5)
    }

    /// Parse a SHA-256 digest from hex.
    ///
    /// # Errors
    ///
    /// Returns an error if the digest is not 64 hex characters.
    pub fn sha256(digest: &str) -> Result<Self, ChecksumError> {
        decode::<32>("sha256", digest).map(Self::Sha256)
    }

    /// Returns the algorithm name (`"md5"` or `"sha256"`).
    #[must_use]
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Md5(_) => "md5",
            Self::Sha256(_) => "sha256",
        }
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Md5(bytes) => bytes,
            Self::Sha256(bytes) => bytes,
        }
    }
}

/// Decode a fixed-size hex digest.
fn decode<const N: usize>(
    algorithm: &'static str,
    digest: &str,
) -> Result<[u8; N], ChecksumError> {
    if digest.len() != 2 * N {
        return Err(ChecksumError::WrongLength {
            algorithm,
            digest: digest.to_string(),
            expected: 2 * N,
        });
    }

    let mut bytes = [0u8; N];
    hex::decode_to_slice(digest, &mut bytes).map_err(|_| ChecksumError::NotHex {
        algorithm,
        digest: digest.to_string(),
    })?;
    Ok(bytes)
}

impl std::fmt::Display for Checksum {
    /// Writes the digest as lowercase hex, without the algorithm tag.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.as_bytes()))
    }
}

impl Serialize for Checksum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Checksum", 2)?;
        state.serialize_field("algorithm", self.algorithm())?;
        state.serialize_field("digest", &self.to_string())?;
        state.end()
    }
}
