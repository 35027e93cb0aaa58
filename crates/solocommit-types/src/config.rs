//! Settlement configuration.
//!
//! Every field is explicit; the defaults are the constants in
//! [`crate::constants`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CommitError, Network, Result, constants};

/// How the contract's redeem script is hashed into its locking script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    /// `OP_HASH160 <hash160(script)> OP_EQUAL`.
    P2sh20,
    /// `OP_HASH256 <hash256(script)> OP_EQUAL`.
    #[default]
    P2sh32,
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::P2sh20 => write!(f, "p2sh20"),
            Self::P2sh32 => write!(f, "p2sh32"),
        }
    }
}

impl FromStr for AddressType {
    type Err = CommitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "p2sh20" => Ok(Self::P2sh20),
            "p2sh32" => Ok(Self::P2sh32),
            other => Err(CommitError::Configuration(format!(
                "unknown address type '{other}' (expected p2sh20 or p2sh32)"
            ))),
        }
    }
}

/// Fee, dust, and network settings shared by all settlement actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Hardcoded fee in satoshis; never estimated.
    pub tx_fee: u64,
    /// Smallest output the network relays.
    pub dust_floor: u64,
    pub network: Network,
    pub address_type: AddressType,
}

impl SettlementConfig {
    /// Build a validated configuration.
    ///
    /// # Errors
    /// [`CommitError::Configuration`] if the dust floor is zero or the fee is
    /// larger than the coin supply.
    pub fn new(
        tx_fee: u64,
        dust_floor: u64,
        network: Network,
        address_type: AddressType,
    ) -> Result<Self> {
        let config = Self {
            tx_fee,
            dust_floor,
            network,
            address_type,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dust_floor == 0 {
            return Err(CommitError::Configuration(
                "dust floor must be positive".into(),
            ));
        }
        if self.tx_fee > constants::MAX_MONEY {
            return Err(CommitError::Configuration(format!(
                "fee {} exceeds the maximum supply",
                self.tx_fee
            )));
        }
        Ok(())
    }

    /// Same settings on another network.
    #[must_use]
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            tx_fee: constants::DEFAULT_TX_FEE,
            dust_floor: constants::P2PKH_DUST,
            network: Network::Mainnet,
            address_type: AddressType::P2sh32,
        }
    }
}
