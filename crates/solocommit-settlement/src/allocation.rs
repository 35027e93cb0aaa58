//! Fund allocation arithmetic for the three settlement actions.
//!
//! Everything here is exact `u64` arithmetic on satoshis. A balance that
//! cannot cover the fee is rejected with `InsufficientFunds`; no amount is
//! ever allowed to wrap.
//!
//! ```text
//! release: claim = max(claim_amount, dust); change = B - claim - F
//!          change < dust  =>  claim = B - F, change = 0
//! cancel:  R = B - F; refund = floor(R * 70 / 100); sweep = R - refund
//! sweep:   claim = B - F
//! ```

use serde::{Deserialize, Serialize};
use solocommit_types::{
    Address, CommitError, CommitmentParameters, FundAllocation, Result, SettlementAction,
    SettlementConfig, constants, identity_hash_to_address,
};

/// Amounts paid by a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSplit {
    /// Paid to the owner.
    pub claim: u64,
    /// Re-locked at the contract address; zero means no change output.
    pub change: u64,
}

/// Amounts paid by a cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelSplit {
    /// Owner's share, rounded down.
    pub refund: u64,
    /// Arbiter's share: the rest.
    pub sweep: u64,
}

/// Balance minus fee, or `InsufficientFunds`.
fn remaining(action: SettlementAction, balance: u64, fee: u64) -> Result<u64> {
    balance
        .checked_sub(fee)
        .ok_or(CommitError::InsufficientFunds {
            action,
            balance,
            required: fee,
        })
}

/// Release split for `balance`.
///
/// Sub-dust change (including a balance too small to cover the full claim)
/// is folded into the claim, so the outputs always total `balance - fee`.
pub fn release_split(
    balance: u64,
    claim_amount: u64,
    fee: u64,
    dust_floor: u64,
) -> Result<ReleaseSplit> {
    let available = remaining(SettlementAction::Release, balance, fee)?;
    let claim = claim_amount.max(dust_floor);
    match available.checked_sub(claim) {
        Some(change) if change >= dust_floor => Ok(ReleaseSplit { claim, change }),
        _ => Ok(ReleaseSplit {
            claim: available,
            change: 0,
        }),
    }
}

/// Cancel split for `balance`: 70% to the owner, rounded down, the rest to
/// the arbiter.
pub fn cancel_split(balance: u64, fee: u64) -> Result<CancelSplit> {
    let remaining = remaining(SettlementAction::Cancel, balance, fee)?;
    Ok(split_percent(remaining, constants::CANCEL_REFUND_PERCENT))
}

/// `floor(amount * percent / 100)` and the remainder, without overflow.
fn split_percent(amount: u64, percent: u64) -> CancelSplit {
    let refund = amount / 100 * percent + amount % 100 * percent / 100;
    CancelSplit {
        refund,
        sweep: amount - refund,
    }
}

/// Sweep payout for `balance`.
pub fn sweep_amount(balance: u64, fee: u64) -> Result<u64> {
    remaining(SettlementAction::Sweep, balance, fee)
}

/// Outputs for `action` given the current contract balance.
pub fn allocate(
    action: SettlementAction,
    balance: u64,
    parameters: &CommitmentParameters,
    config: &SettlementConfig,
    contract: &Address,
) -> Result<FundAllocation> {
    let owner = identity_hash_to_address(parameters.owner_hash(), config.network);
    let mut allocation = FundAllocation::new();
    match action {
        SettlementAction::Release => {
            let split = release_split(
                balance,
                parameters.claim_amount(),
                config.tx_fee,
                config.dust_floor,
            )?;
            allocation.push(owner, split.claim);
            if split.change > 0 {
                allocation.push(contract.clone(), split.change);
            }
        }
        SettlementAction::Cancel => {
            let split = cancel_split(balance, config.tx_fee)?;
            let arbiter = identity_hash_to_address(parameters.arbiter_hash(), config.network);
            allocation.push(owner, split.refund);
            allocation.push(arbiter, split.sweep);
        }
        SettlementAction::Sweep => {
            allocation.push(owner, sweep_amount(balance, config.tx_fee)?);
        }
    }
    Ok(allocation)
}
