//! The chain provider seam.
//!
//! A [`ChainProvider`] answers "what is locked at this address" and turns a
//! fully computed [`SettlementRequest`] into a broadcast transaction. The
//! settlement logic never sees sockets, transactions, or signatures; it only
//! decides which function to call and where the money goes.

use std::future::Future;

use solocommit_types::{
    Address, CommitError, FundAllocation, Result, SettlementAction, SigningCredential, Utxo,
    total_value,
};

/// One argument of a contract function call, in ABI order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionArg {
    /// Serialized public key.
    PublicKey(Vec<u8>),
    /// Placeholder for the signer's transaction signature. The provider
    /// fills it in once the spending transaction is known.
    Signature,
    /// Script number.
    Int(i64),
}

impl FunctionArg {
    /// Arguments for `action` signed by `signer`, in ABI order: public key,
    /// signature, and for release and cancel the hardcoded fee the program
    /// checks the outputs against.
    #[must_use]
    pub fn for_action(
        action: SettlementAction,
        signer: &SigningCredential,
        fee: u64,
    ) -> Vec<Self> {
        let mut args = vec![Self::PublicKey(signer.public_key_bytes()), Self::Signature];
        if action != SettlementAction::Sweep {
            args.push(Self::Int(i64::try_from(fee).unwrap_or(i64::MAX)));
        }
        args
    }
}

/// Everything a provider needs to build, sign, and broadcast one settlement.
#[derive(Debug, Clone)]
pub struct SettlementRequest<'a> {
    pub action: SettlementAction,
    /// Branch selector pushed before the redeem script, if the contract has
    /// more than one function.
    pub selector: Option<usize>,
    pub args: Vec<FunctionArg>,
    pub signer: &'a SigningCredential,
    pub contract: &'a Address,
    pub redeem_script: &'a [u8],
    /// Contract outputs to spend. All of them, for every action.
    pub inputs: Vec<Utxo>,
    pub allocation: FundAllocation,
    pub fee: u64,
}

impl SettlementRequest<'_> {
    pub fn input_total(&self) -> Result<u64> {
        total_value(&self.inputs)
    }

    /// Check `inputs == outputs + fee`.
    ///
    /// # Errors
    /// [`CommitError::Internal`] if the amounts do not balance. Allocation
    /// always produces balanced requests, so this indicates a bug.
    /// [`CommitError::ProviderError`] if the input values overflow.
    pub fn check_balanced(&self) -> Result<()> {
        let inputs = self.input_total()?;
        let outputs = self.allocation.total()?;
        if outputs.checked_add(self.fee) != Some(inputs) {
            return Err(CommitError::Internal(format!(
                "{} request is unbalanced: inputs {inputs}, outputs {outputs} + fee {}",
                self.action, self.fee
            )));
        }
        Ok(())
    }
}

/// Read and write access to the chain.
///
/// Implementations must be safe to share across tasks. Every method is a
/// single round trip; failures map to [`CommitError::ProviderError`] and
/// leave nothing on-chain.
pub trait ChainProvider: Send + Sync {
    /// Unspent outputs currently locked at `address`.
    fn utxos(&self, address: &Address) -> impl Future<Output = Result<Vec<Utxo>>> + Send;

    /// Sum of all unspent outputs at `address`.
    fn balance(&self, address: &Address) -> impl Future<Output = Result<u64>> + Send {
        async move { total_value(&self.utxos(address).await?) }
    }

    /// Build, sign, and broadcast the spending transaction. Returns the
    /// transaction id.
    fn submit(&self, request: &SettlementRequest<'_>)
    -> impl Future<Output = Result<String>> + Send;
}

#[cfg(any(test, feature = "test-helpers"))]
pub use memory::{MemoryProvider, Submission};

#[cfg(any(test, feature = "test-helpers"))]
mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use sha2::{Digest, Sha256};
    use solocommit_types::{
        Address, CommitError, IdentityHash, Output, Result, SettlementAction, Utxo,
    };

    use super::{ChainProvider, FunctionArg, SettlementRequest};

    /// A settlement accepted by [`MemoryProvider`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Submission {
        pub txid: String,
        pub action: SettlementAction,
        pub selector: Option<usize>,
        pub args: Vec<FunctionArg>,
        pub signer: IdentityHash,
        pub inputs: Vec<Utxo>,
        pub outputs: Vec<Output>,
        pub fee: u64,
    }

    /// In-memory chain for tests. Funded outputs are spent on submit and
    /// every accepted request is recorded.
    #[derive(Debug, Default)]
    pub struct MemoryProvider {
        utxos: Mutex<HashMap<String, Vec<Utxo>>>,
        submissions: Mutex<Vec<Submission>>,
        fail_queries: AtomicBool,
        fail_broadcasts: AtomicBool,
    }

    impl MemoryProvider {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Lock a new output of `satoshis` at `address`.
        pub fn fund(&self, address: &Address, satoshis: u64) {
            let mut utxos = self.utxos.lock().unwrap_or_else(|e| e.into_inner());
            let entry = utxos.entry(address.as_str().to_string()).or_default();
            let index = entry.len();
            let txid = hex::encode(Sha256::digest(format!("{address}:{index}:{satoshis}")));
            entry.push(Utxo {
                txid,
                vout: 0,
                satoshis,
                height: 800_000,
            });
        }

        /// All accepted settlements, oldest first.
        #[must_use]
        pub fn submissions(&self) -> Vec<Submission> {
            self.submissions
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        /// Make balance and UTXO queries fail.
        pub fn fail_queries(&self, fail: bool) {
            self.fail_queries.store(fail, Ordering::SeqCst);
        }

        /// Make broadcasts fail.
        pub fn fail_broadcasts(&self, fail: bool) {
            self.fail_broadcasts.store(fail, Ordering::SeqCst);
        }
    }

    impl ChainProvider for MemoryProvider {
        async fn utxos(&self, address: &Address) -> Result<Vec<Utxo>> {
            if self.fail_queries.load(Ordering::SeqCst) {
                return Err(CommitError::provider("utxos", "connection refused"));
            }
            let utxos = self.utxos.lock().unwrap_or_else(|e| e.into_inner());
            Ok(utxos.get(address.as_str()).cloned().unwrap_or_default())
        }

        async fn submit(&self, request: &SettlementRequest<'_>) -> Result<String> {
            if self.fail_broadcasts.load(Ordering::SeqCst) {
                return Err(CommitError::provider("broadcast", "transaction rejected"));
            }
            request.check_balanced()?;

            let mut utxos = self.utxos.lock().unwrap_or_else(|e| e.into_inner());
            let locked = utxos.entry(request.contract.as_str().to_string()).or_default();
            if !request.inputs.iter().all(|input| locked.contains(input)) {
                return Err(CommitError::provider(
                    "broadcast",
                    "missing inputs or already spent",
                ));
            }
            locked.retain(|u| !request.inputs.contains(u));

            let mut hasher = Sha256::new();
            hasher.update(request.action.function_name());
            for input in &request.inputs {
                hasher.update(input.txid.as_bytes());
                hasher.update(input.vout.to_le_bytes());
            }
            let txid = hex::encode(hasher.finalize());

            // Outputs paying back to the contract stay spendable.
            for (vout, output) in request.allocation.outputs().iter().enumerate() {
                if output.destination == *request.contract {
                    locked.push(Utxo {
                        txid: txid.clone(),
                        vout: u32::try_from(vout).unwrap_or(u32::MAX),
                        satoshis: output.amount,
                        height: 0,
                    });
                }
            }
            drop(utxos);

            self.submissions
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(Submission {
                    txid: txid.clone(),
                    action: request.action,
                    selector: request.selector,
                    args: request.args.clone(),
                    signer: request.signer.identity_hash(),
                    inputs: request.inputs.clone(),
                    outputs: request.allocation.outputs().to_vec(),
                    fee: request.fee,
                });
            Ok(txid)
        }
    }
}
