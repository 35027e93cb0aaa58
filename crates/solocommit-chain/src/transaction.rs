//! Settlement transaction assembly and signing.
//!
//! One transaction per settlement: every contract UTXO is an input, the
//! allocation's outputs are the outputs, and the fee is whatever the inputs
//! leave over (checked equal to the hardcoded fee before anything is built).
//!
//! Each input is unlocked with
//! `<args reversed> <selector> <redeem script>`, where the signature
//! argument commits to the transaction through the `SIGHASH_ALL | FORKID`
//! digest over the redeem script.

use std::str::FromStr;

use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode::{serialize, serialize_hex};
use bitcoin::transaction::Version;
use bitcoin::{Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness};
use sha2::{Digest, Sha256};
use solocommit_contract::script::{push_data, push_int};
use solocommit_contract::{FunctionArg, SettlementRequest};
use solocommit_types::{CommitError, Result};

/// `SIGHASH_ALL | SIGHASH_FORKID`, as committed in the digest.
pub const SIGHASH_ALL_FORKID: u32 = 0x41;

/// The same hash type as appended to each signature.
const HASH_TYPE_BYTE: u8 = 0x41;

/// Non-final sequence so the lock time is enforced.
const INPUT_SEQUENCE: Sequence = Sequence::ENABLE_LOCKTIME_NO_RBF;

/// A fully signed settlement, ready to broadcast.
#[derive(Debug, Clone)]
pub struct SignedSettlement {
    pub transaction: Transaction,
    pub txid: String,
    /// Raw transaction, hex.
    pub hex: String,
}

/// Build and sign the transaction for `request`.
///
/// `lock_height` is the current tip height; the sweep branch compares it
/// against the expiration.
///
/// # Errors
/// - [`CommitError::Internal`] if the request is unbalanced
/// - [`CommitError::InvalidInput`] if an input txid is malformed, there are
///   no inputs, or the lock height is not a block height
pub fn build_settlement(
    request: &SettlementRequest<'_>,
    lock_height: u64,
) -> Result<SignedSettlement> {
    request.check_balanced()?;
    if request.inputs.is_empty() {
        return Err(CommitError::invalid_input(format!(
            "{} has no inputs to spend",
            request.action
        )));
    }

    let input = request
        .inputs
        .iter()
        .map(|utxo| {
            let txid = Txid::from_str(&utxo.txid).map_err(|e| {
                CommitError::invalid_input(format!("malformed txid '{}': {e}", utxo.txid))
            })?;
            Ok(TxIn {
                previous_output: OutPoint::new(txid, utxo.vout),
                script_sig: ScriptBuf::new(),
                sequence: INPUT_SEQUENCE,
                witness: Witness::default(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let output = request
        .allocation
        .outputs()
        .iter()
        .map(|o| TxOut {
            value: Amount::from_sat(o.amount),
            script_pubkey: ScriptBuf::from_bytes(o.destination.locking_script()),
        })
        .collect();

    let lock_time = u32::try_from(lock_height)
        .ok()
        .and_then(|h| LockTime::from_height(h).ok())
        .ok_or_else(|| {
            CommitError::invalid_input(format!("lock height {lock_height} is not a block height"))
        })?;

    let mut transaction = Transaction {
        version: Version::TWO,
        lock_time,
        input,
        output,
    };

    let mut unlocking = Vec::with_capacity(request.inputs.len());
    for (index, utxo) in request.inputs.iter().enumerate() {
        let digest = forkid_sighash(&transaction, index, request.redeem_script, utxo.satoshis)?;
        let mut signature = request.signer.sign_digest(digest);
        signature.push(HASH_TYPE_BYTE);
        unlocking.push(unlocking_script(request, &signature));
    }
    for (txin, script) in transaction.input.iter_mut().zip(unlocking) {
        txin.script_sig = ScriptBuf::from_bytes(script);
    }

    Ok(SignedSettlement {
        txid: transaction.compute_txid().to_string(),
        hex: serialize_hex(&transaction),
        transaction,
    })
}

/// BIP143-style digest with the fork id, signing all inputs and outputs.
///
/// # Errors
/// [`CommitError::Internal`] if `index` is not an input of `tx`.
pub fn forkid_sighash(
    tx: &Transaction,
    index: usize,
    script_code: &[u8],
    value: u64,
) -> Result<[u8; 32]> {
    let input = tx.input.get(index).ok_or_else(|| {
        CommitError::Internal(format!("sighash input {index} out of range"))
    })?;

    let mut prevouts = Vec::with_capacity(tx.input.len() * 36);
    let mut sequences = Vec::with_capacity(tx.input.len() * 4);
    for txin in &tx.input {
        prevouts.extend(serialize(&txin.previous_output));
        sequences.extend(serialize(&txin.sequence));
    }
    let mut outputs = Vec::new();
    for txout in &tx.output {
        outputs.extend(serialize(txout));
    }

    let mut preimage = Vec::with_capacity(160 + script_code.len());
    preimage.extend(serialize(&tx.version));
    preimage.extend(sha256d(&prevouts));
    preimage.extend(sha256d(&sequences));
    preimage.extend(serialize(&input.previous_output));
    preimage.extend(serialize(&ScriptBuf::from_bytes(script_code.to_vec())));
    preimage.extend(value.to_le_bytes());
    preimage.extend(serialize(&input.sequence));
    preimage.extend(sha256d(&outputs));
    preimage.extend(serialize(&tx.lock_time));
    preimage.extend(SIGHASH_ALL_FORKID.to_le_bytes());
    Ok(sha256d(&preimage))
}

/// `<args reversed> <selector> <redeem script>`.
#[must_use]
pub fn unlocking_script(request: &SettlementRequest<'_>, signature: &[u8]) -> Vec<u8> {
    let mut script = Vec::with_capacity(request.redeem_script.len() + 120);
    for arg in request.args.iter().rev() {
        match arg {
            FunctionArg::PublicKey(key) => push_data(&mut script, key),
            FunctionArg::Signature => push_data(&mut script, signature),
            FunctionArg::Int(value) => push_int(&mut script, *value),
        }
    }
    if let Some(selector) = request.selector {
        push_int(&mut script, i64::try_from(selector).unwrap_or(i64::MAX));
    }
    push_data(&mut script, request.redeem_script);
    script
}

fn sha256d(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}
