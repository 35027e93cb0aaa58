//! # solocommit-settlement
//!
//! The commitment lifecycle: who may settle, how the funds are split, and
//! the submission of the settlement transaction.
//!
//! ## Actions
//!
//! - **Release** (arbiter): claim to the owner, sub-dust change absorbed,
//!   remaining change re-locked at the contract
//! - **Cancel** (owner or arbiter): 70% to the owner, rest to the arbiter
//! - **Sweep** (arbiter, after expiration): everything to the owner
//!
//! A zero balance is never an error: every action reports
//! [`SettlementOutcome::NothingToSettle`] instead.
//!
//! [`estimate_height`] picks an expiration height for a wall-clock target.

pub mod allocation;
pub mod authorization;
pub mod engine;
pub mod height;

pub use allocation::{
    CancelSplit, ReleaseSplit, allocate, cancel_split, release_split, sweep_amount,
};
pub use authorization::authorize;
pub use engine::{SettlementEngine, SettlementOutcome, SettlementReceipt};
pub use height::{estimate_height, estimate_height_from_tip};
