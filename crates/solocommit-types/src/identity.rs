//! Identity hashes: the 20-byte `hash160` that names a key on-chain.
//!
//! Hashing is delegated to the `bitcoin` crate's primitives; nothing here
//! holds state.

use std::fmt;
use std::str::FromStr;

use bitcoin::hashes::Hash as _;
use serde::{Deserialize, Serialize};

use crate::{CommitError, Result};

/// `ripemd160(sha256(pubkey))` of a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct IdentityHash([u8; 20]);

impl IdentityHash {
    /// Byte length of an identity hash.
    pub const LEN: usize = 20;

    /// Hash a parsed public key, honouring its compressed/uncompressed form.
    #[must_use]
    pub fn from_public_key(pubkey: &bitcoin::PublicKey) -> Self {
        Self(pubkey.pubkey_hash().to_byte_array())
    }

    pub(crate) fn from_array(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse a hash that was already derived elsewhere (40 hex characters).
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| CommitError::invalid_input(format!("identity hash is not hex: {e}")))?;
        let array: [u8; 20] = bytes.as_slice().try_into().map_err(|_| {
            CommitError::invalid_input(format!(
                "identity hash must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(Self::from_array(array))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for IdentityHash {
    type Err = CommitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

/// Derive the identity hash of a hex-encoded public key.
///
/// Accepts 33-byte compressed and 65-byte uncompressed secp256k1 encodings.
///
/// # Errors
/// [`CommitError::InvalidInput`] if the hex is malformed or the bytes are not
/// a point on the curve.
pub fn to_identity_hash(pubkey_hex: &str) -> Result<IdentityHash> {
    let bytes = hex::decode(pubkey_hex.trim())
        .map_err(|e| CommitError::invalid_input(format!("public key is not hex: {e}")))?;
    let pubkey = bitcoin::PublicKey::from_slice(&bytes)
        .map_err(|e| CommitError::invalid_input(format!("not a secp256k1 public key: {e}")))?;
    Ok(IdentityHash::from_public_key(&pubkey))
}
