//! Settlement engine.
//!
//! Every action runs the same pipeline:
//! 1. Authorize the credential against the action's role
//! 2. Fetch the contract's UTXOs (the balance is their sum)
//! 3. Zero balance: report [`SettlementOutcome::NothingToSettle`]
//! 4. Allocate outputs for the balance
//! 5. Submit one transaction spending every UTXO with the hardcoded fee
//!
//! Authorization happens before any chain query, so a wrong credential is
//! rejected without touching the provider.

use serde::{Deserialize, Serialize};
use solocommit_contract::{ChainProvider, ContractHandle, FunctionArg};
use solocommit_types::{
    Output, Result, Role, SettlementAction, SettlementConfig, SigningCredential, total_value,
};
use tracing::{debug, info};

use crate::allocation::allocate;
use crate::authorization::authorize;

/// A broadcast settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub action: SettlementAction,
    pub txid: String,
    /// Role the signing credential matched.
    pub signer_role: Role,
    /// Contract balance spent by the transaction.
    pub balance: u64,
    pub outputs: Vec<Output>,
    pub fee: u64,
}

/// Result of a settlement call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementOutcome {
    /// The contract holds nothing; no transaction was built.
    NothingToSettle { action: SettlementAction },
    /// A transaction was broadcast.
    Submitted(SettlementReceipt),
}

impl SettlementOutcome {
    #[must_use]
    pub fn receipt(&self) -> Option<&SettlementReceipt> {
        match self {
            Self::Submitted(receipt) => Some(receipt),
            Self::NothingToSettle { .. } => None,
        }
    }
}

/// Runs release, cancel, and sweep against one contract.
#[derive(Debug)]
pub struct SettlementEngine<P> {
    handle: ContractHandle<P>,
    config: SettlementConfig,
}

impl<P: ChainProvider> SettlementEngine<P> {
    /// # Errors
    /// [`CommitError::Configuration`](solocommit_types::CommitError::Configuration)
    /// if `config` is invalid.
    pub fn new(handle: ContractHandle<P>, config: SettlementConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { handle, config })
    }

    #[must_use]
    pub fn handle(&self) -> &ContractHandle<P> {
        &self.handle
    }

    #[must_use]
    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Arbiter pays the claim to the owner early; change stays locked.
    pub async fn release(&self, arbiter: &SigningCredential) -> Result<SettlementOutcome> {
        self.settle(SettlementAction::Release, arbiter).await
    }

    /// Owner or arbiter splits the balance 70/30 between owner and arbiter.
    pub async fn cancel(&self, caller: &SigningCredential) -> Result<SettlementOutcome> {
        self.settle(SettlementAction::Cancel, caller).await
    }

    /// Arbiter pays the whole balance to the owner. The program itself
    /// rejects the spend before the expiration height.
    pub async fn sweep(&self, arbiter: &SigningCredential) -> Result<SettlementOutcome> {
        self.settle(SettlementAction::Sweep, arbiter).await
    }

    /// Run `action` signed by `credential`.
    ///
    /// # Errors
    /// - `Unauthorized` if the credential does not match the action's role
    /// - `InsufficientFunds` if the balance cannot cover the fee
    /// - `ProviderError` if the UTXO query or broadcast fails, or the
    ///   reported outputs sum past the coin supply
    pub async fn settle(
        &self,
        action: SettlementAction,
        credential: &SigningCredential,
    ) -> Result<SettlementOutcome> {
        let parameters = self.handle.parameters();
        let signer_role = authorize(action, credential, parameters)?;

        let inputs = self.handle.utxos().await?;
        let balance = total_value(&inputs)?;
        if balance == 0 {
            info!(
                action = %action,
                address = %self.handle.address(),
                "Contract balance is 0, nothing to settle"
            );
            return Ok(SettlementOutcome::NothingToSettle { action });
        }

        let fee = self.config.tx_fee;
        let allocation = allocate(
            action,
            balance,
            parameters,
            &self.config,
            self.handle.address(),
        )?;
        debug!(
            action = %action,
            balance,
            fee,
            inputs = inputs.len(),
            outputs = ?allocation
                .outputs()
                .iter()
                .map(|o| (o.destination.as_str(), o.amount))
                .collect::<Vec<_>>(),
            "Computed fund allocation"
        );

        let outputs = allocation.outputs().to_vec();
        let args = FunctionArg::for_action(action, credential, fee);
        let request = self
            .handle
            .request(action, credential, args, inputs, allocation, fee)?;
        request.check_balanced()?;

        let txid = self.handle.submit(&request).await?;
        info!(
            action = %action,
            role = %signer_role,
            txid = %txid,
            balance,
            fee,
            "Settlement broadcast"
        );

        Ok(SettlementOutcome::Submitted(SettlementReceipt {
            action,
            txid,
            signer_role,
            balance,
            outputs,
            fee,
        }))
    }
}

#[cfg(test)]
mod tests {
    use solocommit_contract::{Artifact, MemoryProvider};
    use solocommit_types::{AddressType, CommitError, CommitmentParameters, Network};

    use super::*;

    struct Fixture {
        engine: SettlementEngine<MemoryProvider>,
        owner: SigningCredential,
        arbiter: SigningCredential,
    }

    fn fixture(balance: u64) -> Fixture {
        let owner = SigningCredential::fixture(1);
        let arbiter = SigningCredential::fixture(2);
        let params = CommitmentParameters::new(
            owner.identity_hash(),
            arbiter.identity_hash(),
            800_000,
            1000,
        )
        .unwrap();
        let config = SettlementConfig::new(300, 546, Network::Mainnet, AddressType::P2sh32).unwrap();
        let artifact = Artifact::bundled().unwrap();
        let handle =
            ContractHandle::derive(params, &artifact, &config, MemoryProvider::new()).unwrap();
        if balance > 0 {
            handle.provider().fund(handle.address(), balance);
        }
        Fixture {
            engine: SettlementEngine::new(handle, config).unwrap(),
            owner,
            arbiter,
        }
    }

    #[tokio::test]
    async fn zero_balance_is_a_no_op_for_every_action() {
        let f = fixture(0);
        for action in SettlementAction::ALL {
            let outcome = f.engine.settle(action, &f.arbiter).await.unwrap();
            assert_eq!(outcome, SettlementOutcome::NothingToSettle { action });
            assert!(outcome.receipt().is_none());
        }
        assert!(f.engine.handle().provider().submissions().is_empty());
    }

    #[tokio::test]
    async fn release_submits_claim_and_change() {
        let f = fixture(2000);
        let outcome = f.engine.release(&f.arbiter).await.unwrap();
        let receipt = outcome.receipt().unwrap();
        assert_eq!(receipt.signer_role, Role::Arbiter);
        assert_eq!(receipt.balance, 2000);
        let amounts: Vec<u64> = receipt.outputs.iter().map(|o| o.amount).collect();
        assert_eq!(amounts, vec![1000, 700]);
        assert_eq!(&receipt.outputs[1].destination, f.engine.handle().address());

        let subs = f.engine.handle().provider().submissions();
        assert_eq!(subs[0].selector, Some(0));
        assert_eq!(subs[0].args[2], FunctionArg::Int(300));
    }

    #[tokio::test]
    async fn unauthorized_never_reaches_the_provider() {
        let f = fixture(2000);
        let stranger = SigningCredential::fixture(9);
        for action in SettlementAction::ALL {
            let err = f.engine.settle(action, &stranger).await.unwrap_err();
            assert!(matches!(err, CommitError::Unauthorized { .. }));
        }
        // Owner is not the arbiter.
        let err = f.engine.sweep(&f.owner).await.unwrap_err();
        assert!(matches!(err, CommitError::Unauthorized { .. }));
        assert!(f.engine.handle().provider().submissions().is_empty());
    }

    #[tokio::test]
    async fn unauthorized_checked_before_balance_query() {
        let f = fixture(2000);
        f.engine.handle().provider().fail_queries(true);
        let err = f
            .engine
            .release(&SigningCredential::fixture(9))
            .await
            .unwrap_err();
        assert!(matches!(err, CommitError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn balance_below_fee_is_insufficient() {
        let f = fixture(200);
        let err = f.engine.sweep(&f.arbiter).await.unwrap_err();
        assert!(matches!(
            err,
            CommitError::InsufficientFunds {
                balance: 200,
                required: 300,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn broadcast_failure_leaves_funds_in_place() {
        let f = fixture(2000);
        f.engine.handle().provider().fail_broadcasts(true);
        let err = f.engine.cancel(&f.owner).await.unwrap_err();
        assert!(matches!(err, CommitError::ProviderError { .. }));
        assert_eq!(f.engine.handle().balance().await.unwrap(), 2000);

        // Re-running after the fault clears succeeds.
        f.engine.handle().provider().fail_broadcasts(false);
        let outcome = f.engine.cancel(&f.owner).await.unwrap();
        assert_eq!(outcome.receipt().unwrap().signer_role, Role::Owner);
    }

    #[tokio::test]
    async fn invalid_config_rejected() {
        let f = fixture(0);
        let SettlementEngine { handle, .. } = f.engine;
        let config = SettlementConfig {
            dust_floor: 0,
            ..SettlementConfig::default()
        };
        assert!(matches!(
            SettlementEngine::new(handle, config).unwrap_err(),
            CommitError::Configuration(_)
        ));
    }
}
