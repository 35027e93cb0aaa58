//! Contract handle: a parameter set bound to its program, address, and
//! chain provider.

use bitcoin::hashes::{Hash as _, hash160};
use sha2::{Digest, Sha256};
use solocommit_types::{
    Address, AddressType, CommitError, CommitmentParameters, FundAllocation, Result,
    SettlementAction, SettlementConfig, SigningCredential, Utxo, constants,
};
use tracing::debug;

use crate::artifact::Artifact;
use crate::provider::{ChainProvider, FunctionArg, SettlementRequest};

/// An instantiated commitment contract.
///
/// The address is a pure function of the parameters, the artifact, and the
/// address type. Deriving twice with equal inputs yields the same address,
/// which is how an existing escrow is located again later.
#[derive(Debug)]
pub struct ContractHandle<P> {
    parameters: CommitmentParameters,
    artifact: Artifact,
    redeem_script: Vec<u8>,
    address: Address,
    provider: P,
}

impl<P: ChainProvider> ContractHandle<P> {
    /// Instantiate `artifact` with `parameters` and derive its address.
    ///
    /// # Errors
    /// - [`CommitError::ContractTooLarge`] if the redeem script exceeds the
    ///   520-byte standard limit
    /// - [`CommitError::InvalidArtifact`] if the artifact bytecode is unusable
    pub fn derive(
        parameters: CommitmentParameters,
        artifact: &Artifact,
        config: &SettlementConfig,
        provider: P,
    ) -> Result<Self> {
        let redeem_script = artifact.instantiate(&parameters.constructor_args())?;
        if redeem_script.len() > constants::MAX_REDEEM_SCRIPT_SIZE {
            return Err(CommitError::ContractTooLarge {
                size: redeem_script.len(),
                limit: constants::MAX_REDEEM_SCRIPT_SIZE,
            });
        }

        let script_hash = match config.address_type {
            AddressType::P2sh20 => hash160::Hash::hash(&redeem_script)
                .to_byte_array()
                .to_vec(),
            AddressType::P2sh32 => Sha256::digest(Sha256::digest(&redeem_script)).to_vec(),
        };
        let address = Address::p2sh(&script_hash, config.network)?;

        debug!(
            contract = %artifact.contract_name,
            address = %address,
            bytesize = redeem_script.len(),
            network = %config.network,
            "Derived contract address"
        );

        Ok(Self {
            parameters,
            artifact: artifact.clone(),
            redeem_script,
            address,
            provider,
        })
    }

    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    #[must_use]
    pub fn parameters(&self) -> &CommitmentParameters {
        &self.parameters
    }

    #[must_use]
    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Constructor arguments followed by the program.
    #[must_use]
    pub fn redeem_script(&self) -> &[u8] {
        &self.redeem_script
    }

    #[must_use]
    pub fn bytesize(&self) -> usize {
        self.redeem_script.len()
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Current balance at the contract address.
    pub async fn balance(&self) -> Result<u64> {
        self.provider.balance(&self.address).await
    }

    /// Unspent outputs at the contract address.
    pub async fn utxos(&self) -> Result<Vec<Utxo>> {
        self.provider.utxos(&self.address).await
    }

    /// Assemble a request spending `inputs` through `action`.
    pub fn request<'a>(
        &'a self,
        action: SettlementAction,
        signer: &'a SigningCredential,
        args: Vec<FunctionArg>,
        inputs: Vec<Utxo>,
        allocation: FundAllocation,
        fee: u64,
    ) -> Result<SettlementRequest<'a>> {
        Ok(SettlementRequest {
            action,
            selector: self.artifact.selector(action)?,
            args,
            signer,
            contract: &self.address,
            redeem_script: &self.redeem_script,
            inputs,
            allocation,
            fee,
        })
    }

    /// Broadcast a request through the provider.
    pub async fn submit(&self, request: &SettlementRequest<'_>) -> Result<String> {
        self.provider.submit(request).await
    }
}

#[cfg(test)]
mod tests {
    use solocommit_types::{IdentityHash, Network};

    use super::*;
    use crate::MemoryProvider;

    fn params(expiration: u64, claim: u64) -> CommitmentParameters {
        let owner = IdentityHash::from_hex(&"11".repeat(20)).unwrap();
        let arbiter = IdentityHash::from_hex(&"22".repeat(20)).unwrap();
        CommitmentParameters::new(owner, arbiter, expiration, claim).unwrap()
    }

    fn derive(
        params: CommitmentParameters,
        config: &SettlementConfig,
    ) -> Result<ContractHandle<MemoryProvider>> {
        let artifact = Artifact::bundled()?;
        ContractHandle::derive(params, &artifact, config, MemoryProvider::new())
    }

    #[test]
    fn derivation_is_deterministic() {
        let config = SettlementConfig::default();
        let a = derive(params(800_000, 1000), &config).unwrap();
        let b = derive(params(800_000, 1000), &config).unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(a.redeem_script(), b.redeem_script());
    }

    #[test]
    fn any_parameter_change_moves_the_address() {
        let config = SettlementConfig::default();
        let base = derive(params(800_000, 1000), &config).unwrap();
        let later = derive(params(800_001, 1000), &config).unwrap();
        let bigger = derive(params(800_000, 1001), &config).unwrap();
        assert_ne!(base.address(), later.address());
        assert_ne!(base.address(), bigger.address());
    }

    #[test]
    fn address_type_selects_hash() {
        let p2sh32 = derive(params(800_000, 1000), &SettlementConfig::default()).unwrap();
        assert!(p2sh32.address().as_str().starts_with("bitcoincash:p"));
        assert_eq!(p2sh32.address().hash().len(), 32);

        let config = SettlementConfig {
            address_type: AddressType::P2sh20,
            ..SettlementConfig::default()
        };
        let p2sh20 = derive(params(800_000, 1000), &config).unwrap();
        assert_eq!(p2sh20.address().hash().len(), 20);
        assert_eq!(
            p2sh20.address().hash(),
            hash160::Hash::hash(p2sh20.redeem_script()).as_byte_array()
        );
    }

    #[test]
    fn network_selects_prefix() {
        let config = SettlementConfig::default().with_network(Network::Chipnet);
        let handle = derive(params(800_000, 1000), &config).unwrap();
        assert!(handle.address().as_str().starts_with("bchtest:"));
    }

    #[test]
    fn bundled_contract_fits_the_limit() {
        let handle = derive(params(800_000, 1000), &SettlementConfig::default()).unwrap();
        assert!(handle.bytesize() <= constants::MAX_REDEEM_SCRIPT_SIZE);
        assert!(handle.bytesize() > 42);
    }

    #[test]
    fn oversized_program_rejected() {
        let mut artifact = Artifact::bundled().unwrap();
        artifact.bytecode = "51".repeat(500);
        let err = ContractHandle::derive(
            params(800_000, 1000),
            &artifact,
            &SettlementConfig::default(),
            MemoryProvider::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CommitError::ContractTooLarge { limit: 520, .. }
        ));
    }

    #[tokio::test]
    async fn balance_reads_through_provider() {
        let handle = derive(params(800_000, 1000), &SettlementConfig::default()).unwrap();
        assert_eq!(handle.balance().await.unwrap(), 0);
        handle.provider().fund(handle.address(), 2500);
        assert_eq!(handle.balance().await.unwrap(), 2500);
    }
}
