//! System-wide constants for SoloCommit.

/// Hardcoded miner fee (satoshis) attached to every settlement transaction.
pub const DEFAULT_TX_FEE: u64 = 1000;

/// Smallest P2PKH output value (satoshis) the network relays.
pub const P2PKH_DUST: u64 = 546;

/// Largest redeem script the network accepts as a standard P2SH spend.
pub const MAX_REDEEM_SCRIPT_SIZE: usize = 520;

/// Target block interval in seconds.
pub const AVG_BLOCK_TIME_SECS: u64 = 600;

/// Lock-time values at or above this are read as UNIX timestamps, not heights.
pub const LOCKTIME_THRESHOLD: u64 = 500_000_000;

/// Satoshis per whole coin.
pub const COIN: u64 = 100_000_000;

/// Total supply cap in satoshis.
pub const MAX_MONEY: u64 = 21_000_000 * COIN;

/// Share of the post-fee balance refunded to the owner on cancel (percent).
pub const CANCEL_REFUND_PERCENT: u64 = 70;

/// Version byte prefixed to a P2PKH hash in legacy base58 addresses.
pub const LEGACY_P2PKH_VERSION: u8 = 0x00;

/// Claim amount used when none is configured.
pub const DEFAULT_CLAIM_AMOUNT: u64 = 1000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
