//! Fund allocation: the ordered outputs a settlement pays.

use serde::{Deserialize, Serialize};

use crate::{Address, CommitError, Result};

/// A single payment in a settlement transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub destination: Address,
    /// Satoshis.
    pub amount: u64,
}

/// Ordered outputs computed for one settlement call. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundAllocation {
    outputs: Vec<Output>,
}

impl FundAllocation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an output, keeping insertion order.
    pub fn push(&mut self, destination: Address, amount: u64) {
        self.outputs.push(Output {
            destination,
            amount,
        });
    }

    #[must_use]
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Sum of all output amounts.
    pub fn total(&self) -> Result<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.amount))
            .ok_or_else(|| CommitError::Internal("allocation total overflows u64".into()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}
