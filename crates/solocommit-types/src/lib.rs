//! # solocommit-types
//!
//! Shared types, errors, and configuration for **SoloCommit** escrow
//! commitments.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identities**: [`IdentityHash`], [`to_identity_hash`], [`SigningCredential`]
//! - **Addresses**: [`Address`], [`Network`], [`legacy_address`], [`identity_hash_to_address`]
//! - **Commitment model**: [`CommitmentParameters`], [`ConstructorArg`]
//! - **Settlement model**: [`SettlementAction`], [`Role`], [`FundAllocation`], [`Output`]
//! - **Chain model**: [`Utxo`], [`ChainTip`]
//! - **Configuration**: [`SettlementConfig`], [`AddressType`]
//! - **Errors**: [`CommitError`] with `SC_ERR_` prefix codes
//! - **Constants**: fees, dust floor, script limits

pub mod action;
pub mod address;
pub mod allocation;
mod cashaddr;
pub mod chain;
pub mod config;
pub mod constants;
pub mod credential;
pub mod error;
pub mod identity;
pub mod params;

pub use action::*;
pub use address::*;
pub use allocation::*;
pub use chain::*;
pub use config::*;
pub use credential::*;
pub use error::*;
pub use identity::*;
pub use params::*;

// Constants are accessed via `solocommit_types::constants::FOO`
// (not re-exported to avoid name collisions).
