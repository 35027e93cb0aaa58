//! Command-line and environment arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use solocommit_chain::DEFAULT_STATS_URL;
use solocommit_types::{
    AddressType, CommitError, Network, Result, SettlementAction, SigningCredential, constants,
};

/// Plain-TCP Electrum endpoint used when none is configured.
pub const DEFAULT_ELECTRUM: &str = "bch.imaginary.cash:50001";

/// What to do with the commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Print the contract address, balance, and UTXOs.
    Balance,
    /// Arbiter releases the claim amount to the owner.
    Release,
    /// Owner or arbiter splits the funds 70/30.
    Cancel,
    /// Arbiter sweeps everything to the owner after expiration.
    Sweep,
}

impl Action {
    /// The settlement this action runs and the credential that signs it.
    /// Release and sweep are always signed by the arbiter; cancel by
    /// `cancel_signer`. `None` for read-only actions.
    pub fn settlement(self, cancel_signer: Signer) -> Option<(SettlementAction, Signer)> {
        match self {
            Self::Balance => None,
            Self::Release => Some((SettlementAction::Release, Signer::Arbiter)),
            Self::Cancel => Some((SettlementAction::Cancel, cancel_signer)),
            Self::Sweep => Some((SettlementAction::Sweep, Signer::Arbiter)),
        }
    }
}

/// Which configured credential signs a cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Signer {
    Owner,
    Arbiter,
}

#[derive(Parser, Debug)]
#[command(
    name = "solocommit",
    version,
    about = "Owner/arbiter/expiration escrow commitments on Bitcoin Cash"
)]
pub struct Args {
    #[arg(value_enum)]
    pub action: Action,

    /// Expiration block height. Estimated five minutes from the current tip
    /// when omitted.
    pub expiration: Option<u64>,

    /// Owner public key (hex).
    #[arg(long, env = "OWNER_PUBKEY")]
    pub owner_pubkey: String,

    /// Arbiter public key (hex).
    #[arg(long, env = "ARBITER_PUBKEY")]
    pub arbiter_pubkey: String,

    #[arg(long, env = "OWNER_WIF", hide_env_values = true)]
    pub owner_wif: Option<String>,

    #[arg(long, env = "ARBITER_WIF", hide_env_values = true)]
    pub arbiter_wif: Option<String>,

    /// Credential that signs a cancel.
    #[arg(long, value_enum, default_value = "owner")]
    pub signer: Signer,

    /// Satoshis released to the owner.
    #[arg(long, env = "SOLOCOMMIT_CLAIM_AMOUNT", default_value_t = constants::DEFAULT_CLAIM_AMOUNT)]
    pub claim_amount: u64,

    /// Hardcoded fee per settlement, in satoshis.
    #[arg(long, env = "SOLOCOMMIT_TX_FEE", default_value_t = constants::DEFAULT_TX_FEE)]
    pub tx_fee: u64,

    #[arg(long, env = "SOLOCOMMIT_NETWORK", default_value = "mainnet")]
    pub network: Network,

    #[arg(long, env = "SOLOCOMMIT_ADDRESS_TYPE", default_value = "p2sh32")]
    pub address_type: AddressType,

    /// Electrum server, `host:port` (plain TCP).
    #[arg(long, env = "SOLOCOMMIT_ELECTRUM", default_value = DEFAULT_ELECTRUM)]
    pub electrum: String,

    /// Compiled contract artifact JSON. Falls back to the bundled stand-in,
    /// which does not enforce outputs or the fee on-chain.
    #[arg(long, env = "SOLOCOMMIT_ARTIFACT")]
    pub artifact: Option<PathBuf>,

    /// Block explorer stats endpoint used to estimate the expiration.
    #[arg(long, env = "SOLOCOMMIT_STATS_URL", default_value = DEFAULT_STATS_URL)]
    pub stats_url: String,

    /// Timeout for each network call, in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Emit logs as JSON lines.
    #[arg(long, env = "SOLOCOMMIT_LOG_JSON")]
    pub log_json: bool,
}

impl Args {
    /// Credential for `signer`, decoded from its WIF.
    pub fn credential(&self, signer: Signer) -> Result<SigningCredential> {
        let (wif, var) = match signer {
            Signer::Owner => (self.owner_wif.as_deref(), "OWNER_WIF"),
            Signer::Arbiter => (self.arbiter_wif.as_deref(), "ARBITER_WIF"),
        };
        let wif = wif.ok_or_else(|| {
            CommitError::Configuration(format!("{var} is required for {:?}", self.action))
        })?;
        SigningCredential::from_wif(wif)
    }
}
