//! Error types for SoloCommit.
//!
//! All errors use the `SC_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Input errors (keys, hashes, addresses)
//! - 2xx: Commitment parameter / contract errors
//! - 3xx: Authorization errors
//! - 4xx: Settlement errors
//! - 5xx: Chain provider errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{Role, SettlementAction};

/// Central error enum for all SoloCommit operations.
#[derive(Debug, Error)]
pub enum CommitError {
    // =================================================================
    // Input Errors (1xx)
    // =================================================================
    /// A key, hash, credential, or address encoding was malformed.
    #[error("SC_ERR_100: Invalid input: {reason}")]
    InvalidInput { reason: String },

    // =================================================================
    // Parameter / Contract Errors (2xx)
    // =================================================================
    /// Commitment parameters cannot be represented by the contract.
    #[error("SC_ERR_200: Invalid commitment parameters: {reason}")]
    InvalidParameters { reason: String },

    /// The instantiated program exceeds the standard redeem-script ceiling.
    #[error("SC_ERR_201: Contract too large: {size} bytes exceeds the {limit}-byte limit")]
    ContractTooLarge { size: usize, limit: usize },

    /// The contract artifact does not describe the expected program.
    #[error("SC_ERR_202: Invalid contract artifact: {reason}")]
    InvalidArtifact { reason: String },

    // =================================================================
    // Authorization Errors (3xx)
    // =================================================================
    /// The presented credential does not belong to the role the action needs.
    ///
    /// Only the role is reported, never the stored hash it was compared to.
    #[error("SC_ERR_300: Unauthorized {action}: credential does not belong to the {role}")]
    Unauthorized {
        action: SettlementAction,
        role: Role,
    },

    // =================================================================
    // Settlement Errors (4xx)
    // =================================================================
    /// The contract balance cannot cover the outputs plus the fee.
    #[error("SC_ERR_400: Insufficient funds for {action}: balance {balance}, required {required}")]
    InsufficientFunds {
        action: SettlementAction,
        balance: u64,
        required: u64,
    },

    // =================================================================
    // Provider Errors (5xx)
    // =================================================================
    /// Balance query, UTXO fetch, or broadcast failed.
    ///
    /// Nothing has moved on-chain when this is returned, so the whole
    /// invocation can be re-run.
    #[error("SC_ERR_500: Provider error during {operation}: {reason}")]
    ProviderError { operation: String, reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SC_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("SC_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (missing environment, bad values).
    #[error("SC_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (disk, network).
    #[error("SC_ERR_903: I/O error: {0}")]
    Io(String),
}

impl CommitError {
    /// Shorthand for a [`CommitError::ProviderError`].
    pub fn provider(operation: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::ProviderError {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a [`CommitError::InvalidInput`].
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, CommitError>;

// Conversion from std::io::Error
impl From<std::io::Error> for CommitError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CommitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
