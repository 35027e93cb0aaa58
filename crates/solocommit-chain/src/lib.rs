//! # solocommit-chain
//!
//! Adapters between the settlement engine and a live Bitcoin Cash network.
//!
//! - [`ElectrumProvider`]: [`ChainProvider`](solocommit_contract::ChainProvider)
//!   over an Electrum server (UTXO queries, tip, broadcast)
//! - [`build_settlement`]: assembles and signs the spending transaction
//! - [`StatsClient`]: best height and block time from a block explorer

pub mod electrum;
pub mod stats;
pub mod transaction;

pub use electrum::{ElectrumClient, ElectrumProvider, electrum_scripthash};
pub use stats::{DEFAULT_STATS_URL, StatsClient, parse_stats};
pub use transaction::{SIGHASH_ALL_FORKID, SignedSettlement, build_settlement, forkid_sighash};
