//! Commitment parameters: the four values that fix a contract's identity.

use serde::{Deserialize, Serialize};

use crate::{CommitError, IdentityHash, Result, constants, to_identity_hash};

/// One constructor argument, in the encoding the contract program expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArg {
    /// Raw bytes (`bytes20` identity hashes).
    Bytes(Vec<u8>),
    /// Script number (`int`).
    Int(i64),
}

/// Immutable owner/arbiter/expiration/claim tuple.
///
/// Two equal parameter sets always derive the same contract address. Owner
/// and arbiter may be the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentParameters {
    owner_hash: IdentityHash,
    arbiter_hash: IdentityHash,
    expiration_height: u64,
    claim_amount: u64,
}

impl CommitmentParameters {
    /// Validate and build a parameter set.
    ///
    /// # Errors
    /// [`CommitError::InvalidParameters`] if the expiration is not a block
    /// height (it would be read as a timestamp by the lock-time check) or the
    /// claim exceeds the total coin supply.
    pub fn new(
        owner_hash: IdentityHash,
        arbiter_hash: IdentityHash,
        expiration_height: u64,
        claim_amount: u64,
    ) -> Result<Self> {
        if expiration_height >= constants::LOCKTIME_THRESHOLD {
            return Err(CommitError::InvalidParameters {
                reason: format!(
                    "expiration {expiration_height} is not a block height (must be below {})",
                    constants::LOCKTIME_THRESHOLD
                ),
            });
        }
        if claim_amount > constants::MAX_MONEY {
            return Err(CommitError::InvalidParameters {
                reason: format!(
                    "claim amount {claim_amount} exceeds the maximum supply {}",
                    constants::MAX_MONEY
                ),
            });
        }
        Ok(Self {
            owner_hash,
            arbiter_hash,
            expiration_height,
            claim_amount,
        })
    }

    /// Build from hex-encoded owner and arbiter public keys.
    pub fn from_public_keys(
        owner_pubkey_hex: &str,
        arbiter_pubkey_hex: &str,
        expiration_height: u64,
        claim_amount: u64,
    ) -> Result<Self> {
        Self::new(
            to_identity_hash(owner_pubkey_hex)?,
            to_identity_hash(arbiter_pubkey_hex)?,
            expiration_height,
            claim_amount,
        )
    }

    #[must_use]
    pub fn owner_hash(&self) -> &IdentityHash {
        &self.owner_hash
    }

    #[must_use]
    pub fn arbiter_hash(&self) -> &IdentityHash {
        &self.arbiter_hash
    }

    #[must_use]
    pub fn expiration_height(&self) -> u64 {
        self.expiration_height
    }

    #[must_use]
    pub fn claim_amount(&self) -> u64 {
        self.claim_amount
    }

    /// Constructor arguments in declaration order:
    /// `(owner_hash, arbiter_hash, expiration_height, claim_amount)`.
    ///
    /// The order is part of the program's binary identity; reordering
    /// changes the derived address.
    #[must_use]
    pub fn constructor_args(&self) -> [ConstructorArg; 4] {
        // Both bounds are checked in `new`, far below i64::MAX.
        let expiration = i64::try_from(self.expiration_height).unwrap_or(i64::MAX);
        let claim = i64::try_from(self.claim_amount).unwrap_or(i64::MAX);
        [
            ConstructorArg::Bytes(self.owner_hash.as_bytes().to_vec()),
            ConstructorArg::Bytes(self.arbiter_hash.as_bytes().to_vec()),
            ConstructorArg::Int(expiration),
            ConstructorArg::Int(claim),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> IdentityHash {
        IdentityHash::from_hex(&hex::encode([byte; 20])).unwrap()
    }

    #[test]
    fn constructor_args_keep_declaration_order() {
        let params = CommitmentParameters::new(hash(1), hash(2), 800_000, 1000).unwrap();
        let args = params.constructor_args();
        assert_eq!(args[0], ConstructorArg::Bytes(vec![1; 20]));
        assert_eq!(args[1], ConstructorArg::Bytes(vec![2; 20]));
        assert_eq!(args[2], ConstructorArg::Int(800_000));
        assert_eq!(args[3], ConstructorArg::Int(1000));
    }

    #[test]
    fn owner_may_equal_arbiter() {
        let params = CommitmentParameters::new(hash(4), hash(4), 10, 0).unwrap();
        assert_eq!(params.owner_hash(), params.arbiter_hash());
    }

    #[test]
    fn zero_values_accepted() {
        let params = CommitmentParameters::new(hash(1), hash(2), 0, 0).unwrap();
        assert_eq!(params.expiration_height(), 0);
        assert_eq!(params.claim_amount(), 0);
    }

    #[test]
    fn timestamp_expiration_rejected() {
        let err = CommitmentParameters::new(hash(1), hash(2), 1_700_000_000, 1000).unwrap_err();
        assert!(matches!(err, CommitError::InvalidParameters { .. }));
    }

    #[test]
    fn claim_above_supply_rejected() {
        let err =
            CommitmentParameters::new(hash(1), hash(2), 10, constants::MAX_MONEY + 1).unwrap_err();
        assert!(matches!(err, CommitError::InvalidParameters { .. }));
    }

    #[test]
    fn from_public_keys_rejects_bad_key() {
        let err = CommitmentParameters::from_public_keys("02ab", "02cd", 10, 1000).unwrap_err();
        assert!(matches!(err, CommitError::InvalidInput { .. }));
    }

    #[test]
    fn serde_roundtrip() {
        let params = CommitmentParameters::new(hash(1), hash(2), 800_000, 1000).unwrap();
        let json = serde_json::to_string(&params).unwrap();
        let back: CommitmentParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }
}
