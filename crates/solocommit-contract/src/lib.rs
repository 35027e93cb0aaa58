//! # solocommit-contract
//!
//! Binds [`CommitmentParameters`](solocommit_types::CommitmentParameters) to
//! the precompiled `SoloCommitment` program.
//!
//! - [`Artifact`]: the compiled program and its function interface
//! - [`ContractHandle`]: redeem script, derived address, balance queries
//! - [`ChainProvider`]: the seam to the chain; build, sign, and broadcast
//!   live behind it
//!
//! With the `test-helpers` feature, [`MemoryProvider`] is an in-memory chain
//! for tests.

pub mod artifact;
pub mod handle;
pub mod provider;
pub mod script;

pub use artifact::{AbiFunction, AbiInput, Artifact};
pub use handle::ContractHandle;
#[cfg(any(test, feature = "test-helpers"))]
pub use provider::{MemoryProvider, Submission};
pub use provider::{ChainProvider, FunctionArg, SettlementRequest};
