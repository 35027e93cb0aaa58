//! Payable addresses and the locking scripts behind them.
//!
//! Every function here is pure: the same hash and network always produce
//! the same address.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cashaddr::{self, AddrType};
use crate::{CommitError, IdentityHash, Result, constants};

// Script opcodes used by the standard locking templates.
const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_HASH256: u8 = 0xaa;
const OP_EQUAL: u8 = 0x87;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;

/// The network an address is encoded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Chipnet,
    Testnet,
    Regtest,
}

impl Network {
    /// CashAddr human-readable prefix.
    #[must_use]
    pub fn cashaddr_prefix(&self) -> &'static str {
        match self {
            Self::Mainnet => "bitcoincash",
            Self::Chipnet | Self::Testnet => "bchtest",
            Self::Regtest => "bchreg",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Chipnet => write!(f, "chipnet"),
            Self::Testnet => write!(f, "testnet"),
            Self::Regtest => write!(f, "regtest"),
        }
    }
}

impl FromStr for Network {
    type Err = CommitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "chipnet" => Ok(Self::Chipnet),
            "testnet" | "testnet4" => Ok(Self::Testnet),
            "regtest" => Ok(Self::Regtest),
            other => Err(CommitError::invalid_input(format!("unknown network '{other}'"))),
        }
    }
}

/// What an address pays to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressKind {
    /// Pay to a key's identity hash.
    P2pkh,
    /// Pay to a script hash (20- or 32-byte).
    P2sh,
}

/// A payable address: its CashAddr form plus enough to rebuild its locking
/// script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    cashaddr: String,
    kind: AddressKind,
    hash: Vec<u8>,
}

impl Address {
    /// P2PKH address of an identity hash.
    #[must_use]
    pub fn p2pkh(hash: &IdentityHash, network: Network) -> Self {
        let hash = hash.as_bytes().to_vec();
        // 20-byte payloads are always encodable.
        let cashaddr = cashaddr::encode(network.cashaddr_prefix(), AddrType::P2pkh, &hash)
            .unwrap_or_default();
        Self {
            cashaddr,
            kind: AddressKind::P2pkh,
            hash,
        }
    }

    /// P2SH address of a script hash; 20 bytes (`hash160`) or 32 bytes
    /// (`hash256`).
    pub fn p2sh(script_hash: &[u8], network: Network) -> Result<Self> {
        if script_hash.len() != 20 && script_hash.len() != 32 {
            return Err(CommitError::invalid_input(format!(
                "script hash must be 20 or 32 bytes, got {}",
                script_hash.len()
            )));
        }
        let cashaddr = cashaddr::encode(network.cashaddr_prefix(), AddrType::P2sh, script_hash)
            .ok_or_else(|| CommitError::Internal("cashaddr rejected a valid length".into()))?;
        Ok(Self {
            cashaddr,
            kind: AddressKind::P2sh,
            hash: script_hash.to_vec(),
        })
    }

    /// Reformat a legacy base58check P2PKH address for `network`.
    pub fn from_legacy(legacy: &str, network: Network) -> Result<Self> {
        let decoded = bitcoin::base58::decode_check(legacy.trim())
            .map_err(|e| CommitError::invalid_input(format!("malformed legacy address: {e}")))?;
        match decoded.split_first() {
            Some((&constants::LEGACY_P2PKH_VERSION, hash)) if hash.len() == IdentityHash::LEN => {
                let mut array = [0u8; 20];
                array.copy_from_slice(hash);
                Ok(Self::p2pkh(&IdentityHash::from_array(array), network))
            }
            _ => Err(CommitError::invalid_input(
                "legacy address is not a P2PKH payload",
            )),
        }
    }

    /// The CashAddr string, e.g. `bitcoincash:qp...`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.cashaddr
    }

    #[must_use]
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// The hash this address commits to.
    #[must_use]
    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    /// Serialized locking script (`scriptPubKey`) paying to this address.
    #[must_use]
    pub fn locking_script(&self) -> Vec<u8> {
        match (self.kind, self.hash.len()) {
            (AddressKind::P2pkh, _) => {
                let mut script = vec![OP_DUP, OP_HASH160, 20];
                script.extend_from_slice(&self.hash);
                script.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
                script
            }
            (AddressKind::P2sh, 32) => {
                let mut script = vec![OP_HASH256, 32];
                script.extend_from_slice(&self.hash);
                script.push(OP_EQUAL);
                script
            }
            (AddressKind::P2sh, _) => {
                let mut script = vec![OP_HASH160, 20];
                script.extend_from_slice(&self.hash);
                script.push(OP_EQUAL);
                script
            }
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cashaddr)
    }
}

/// Legacy base58check form of a P2PKH identity hash:
/// `base58(0x00 || hash || sha256d(0x00 || hash)[..4])`.
#[must_use]
pub fn legacy_address(hash: &IdentityHash) -> String {
    let mut data = Vec::with_capacity(1 + IdentityHash::LEN);
    data.push(constants::LEGACY_P2PKH_VERSION);
    data.extend_from_slice(hash.as_bytes());
    bitcoin::base58::encode_check(&data)
}

/// Payable address of an identity hash in `network`'s encoding.
///
/// Equivalent to reformatting [`legacy_address`] with
/// [`Address::from_legacy`].
#[must_use]
pub fn identity_hash_to_address(hash: &IdentityHash, network: Network) -> Address {
    Address::p2pkh(hash, network)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_hash() -> IdentityHash {
        IdentityHash::from_hex("76a04053bda0a88bda5177b86a15c3b29f559873").unwrap()
    }

    #[test]
    fn legacy_reference_vector() {
        assert_eq!(
            legacy_address(&reference_hash()),
            "1BpEi6DfDAUFd7GtittLSdBeYJvcoaVggu"
        );
    }

    #[test]
    fn mainnet_cashaddr_reference_vector() {
        let addr = identity_hash_to_address(&reference_hash(), Network::Mainnet);
        assert_eq!(
            addr.as_str(),
            "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a"
        );
    }

    #[test]
    fn chipnet_uses_test_prefix() {
        let addr = identity_hash_to_address(&reference_hash(), Network::Chipnet);
        assert!(addr.as_str().starts_with("bchtest:qpm2qsznhks23z7629mms6s4cwef74vcwv"));
    }

    #[test]
    fn address_is_deterministic() {
        let a = identity_hash_to_address(&reference_hash(), Network::Mainnet);
        let b = identity_hash_to_address(&reference_hash(), Network::Mainnet);
        assert_eq!(a, b);
    }

    #[test]
    fn legacy_reformat_matches_direct_encoding() {
        let legacy = legacy_address(&reference_hash());
        for network in [Network::Mainnet, Network::Chipnet, Network::Regtest] {
            assert_eq!(
                Address::from_legacy(&legacy, network).unwrap(),
                identity_hash_to_address(&reference_hash(), network)
            );
        }
    }

    #[test]
    fn corrupted_legacy_rejected() {
        let err = Address::from_legacy("1BpEi6DfDAUFd7GtittLSdBeYJvcoaVggv", Network::Mainnet)
            .unwrap_err();
        assert!(matches!(err, CommitError::InvalidInput { .. }));
    }

    #[test]
    fn p2pkh_locking_script() {
        let addr = identity_hash_to_address(&reference_hash(), Network::Mainnet);
        assert_eq!(
            hex::encode(addr.locking_script()),
            "76a91476a04053bda0a88bda5177b86a15c3b29f55987388ac"
        );
    }

    #[test]
    fn p2sh_locking_scripts() {
        let p2sh20 = Address::p2sh(&[0x11; 20], Network::Mainnet).unwrap();
        assert_eq!(p2sh20.locking_script()[0], OP_HASH160);
        assert_eq!(p2sh20.locking_script().len(), 23);

        let p2sh32 = Address::p2sh(&[0x11; 32], Network::Mainnet).unwrap();
        assert_eq!(p2sh32.locking_script()[0], OP_HASH256);
        assert_eq!(p2sh32.locking_script().len(), 35);

        assert!(Address::p2sh(&[0x11; 31], Network::Mainnet).is_err());
    }

    #[test]
    fn network_parse() {
        assert_eq!("chipnet".parse::<Network>().unwrap(), Network::Chipnet);
        assert_eq!("MAINNET".parse::<Network>().unwrap(), Network::Mainnet);
        assert!("signet".parse::<Network>().is_err());
    }
}
