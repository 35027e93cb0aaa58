//! Chain-state records returned by providers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CommitError, Result, constants};

/// An unspent output locked at the contract address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Utxo {
    /// Funding transaction id, hex in display (big-endian) order.
    pub txid: String,
    pub vout: u32,
    pub satoshis: u64,
    /// Confirmation height; 0 while unconfirmed.
    pub height: u64,
}

/// Best block as reported by a block explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTip {
    pub height: u64,
    pub time: DateTime<Utc>,
}

/// Total value of a set of outputs.
///
/// Output values come from the provider, so the sum is checked: a total
/// that overflows or exceeds the coin supply is a provider fault.
pub fn total_value(utxos: &[Utxo]) -> Result<u64> {
    utxos
        .iter()
        .try_fold(0u64, |acc, u| acc.checked_add(u.satoshis))
        .filter(|total| *total <= constants::MAX_MONEY)
        .ok_or_else(|| {
            CommitError::provider(
                "utxos",
                format!("{} outputs exceed the coin supply", utxos.len()),
            )
        })
}
