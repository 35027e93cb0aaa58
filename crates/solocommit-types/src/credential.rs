//! Signing credentials decoded from WIF private keys.
//!
//! A credential never appears in logs: its `Debug` output only shows the
//! derived identity hash.

use std::fmt;

use bitcoin::secp256k1::{Message, Secp256k1};
use bitcoin::{PrivateKey, PublicKey};

use crate::{CommitError, IdentityHash, Result};

/// A private key plus its derived public key and identity hash.
#[derive(Clone)]
pub struct SigningCredential {
    key: PrivateKey,
    public_key: PublicKey,
}

impl SigningCredential {
    /// Decode a WIF string (mainnet or testnet, compressed or not).
    ///
    /// # Errors
    /// [`CommitError::InvalidInput`] if the string is not a valid WIF key.
    pub fn from_wif(wif: &str) -> Result<Self> {
        let key = PrivateKey::from_wif(wif.trim())
            .map_err(|e| CommitError::invalid_input(format!("malformed WIF credential: {e}")))?;
        Ok(Self::from_private_key(key))
    }

    #[must_use]
    pub fn from_private_key(key: PrivateKey) -> Self {
        let secp = Secp256k1::signing_only();
        let public_key = key.public_key(&secp);
        Self { key, public_key }
    }

    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Serialized public key as it is pushed in unlocking scripts.
    #[must_use]
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key.to_bytes()
    }

    #[must_use]
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    #[must_use]
    pub fn identity_hash(&self) -> IdentityHash {
        IdentityHash::from_public_key(&self.public_key)
    }

    /// DER-encoded ECDSA signature over a 32-byte digest (no hash-type byte).
    #[must_use]
    pub fn sign_digest(&self, digest: [u8; 32]) -> Vec<u8> {
        let secp = Secp256k1::signing_only();
        let message = Message::from_digest(digest);
        secp.sign_ecdsa(&message, &self.key.inner)
            .serialize_der()
            .to_vec()
    }
}

impl fmt::Debug for SigningCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredential")
            .field("identity", &self.identity_hash())
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Deterministic credentials for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl SigningCredential {
    /// Credential whose secret key is `[seed; 32]`. `seed` must be non-zero.
    pub fn fixture(seed: u8) -> Self {
        let secret = bitcoin::secp256k1::SecretKey::from_slice(&[seed; 32])
            .expect("fixture seed yields a valid secret key");
        Self::from_private_key(PrivateKey::new(secret, bitcoin::Network::Bitcoin))
    }

    /// WIF encoding of the credential's key.
    pub fn to_wif(&self) -> String {
        self.key.to_wif()
    }
}
