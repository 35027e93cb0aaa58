//! End-to-end settlement scenarios.
//!
//! Each test derives a fresh contract from parameters, funds it on the
//! in-memory chain, and runs one or more settlement actions through the
//! engine: Derivation -> Authorization -> Allocation -> Submission.

use solocommit_contract::{Artifact, ContractHandle, FunctionArg, MemoryProvider};
use solocommit_settlement::*;
use solocommit_types::*;

/// Helper: one commitment between two fixed parties on a mock chain.
struct Escrow {
    owner: SigningCredential,
    arbiter: SigningCredential,
    engine: SettlementEngine<MemoryProvider>,
}

impl Escrow {
    fn new(claim_amount: u64) -> Self {
        let owner = SigningCredential::fixture(0x11);
        let arbiter = SigningCredential::fixture(0x22);
        let params = CommitmentParameters::from_public_keys(
            &owner.public_key_hex(),
            &arbiter.public_key_hex(),
            800_000,
            claim_amount,
        )
        .expect("Parameters should be valid");
        let config = SettlementConfig::new(300, 546, Network::Mainnet, AddressType::P2sh32)
            .expect("Config should be valid");
        let artifact = Artifact::bundled().expect("Bundled artifact should load");
        let handle = ContractHandle::derive(params, &artifact, &config, MemoryProvider::new())
            .expect("Contract should derive");
        Self {
            owner,
            arbiter,
            engine: SettlementEngine::new(handle, config).expect("Engine should build"),
        }
    }

    fn fund(&self, satoshis: u64) {
        let handle = self.engine.handle();
        handle.provider().fund(handle.address(), satoshis);
    }

    fn owner_address(&self) -> Address {
        identity_hash_to_address(&self.owner.identity_hash(), Network::Mainnet)
    }

    fn arbiter_address(&self) -> Address {
        identity_hash_to_address(&self.arbiter.identity_hash(), Network::Mainnet)
    }

    async fn balance(&self) -> u64 {
        self.engine.handle().balance().await.expect("Balance query")
    }
}

fn amounts(receipt: &SettlementReceipt) -> Vec<(Address, u64)> {
    receipt
        .outputs
        .iter()
        .map(|o| (o.destination.clone(), o.amount))
        .collect()
}

// =============================================================================
// Scenario: release with change above the dust floor
// =============================================================================
#[tokio::test]
async fn e2e_release_with_change() {
    let escrow = Escrow::new(1000);
    escrow.fund(2000);

    let outcome = escrow.engine.release(&escrow.arbiter).await.unwrap();
    let receipt = outcome.receipt().expect("Release should broadcast");

    let contract = escrow.engine.handle().address().clone();
    assert_eq!(
        amounts(receipt),
        vec![(escrow.owner_address(), 1000), (contract, 700)]
    );
    assert_eq!(receipt.fee, 300);

    // Change is re-locked under the same contract.
    assert_eq!(escrow.balance().await, 700);
}

// =============================================================================
// Scenario: release twice; the second absorbs the sub-dust remainder
// =============================================================================
#[tokio::test]
async fn e2e_release_until_drained() {
    let escrow = Escrow::new(1000);
    escrow.fund(3000);

    // 3000 - 1000 - 300 = 1700 change
    let first = escrow.engine.release(&escrow.arbiter).await.unwrap();
    assert_eq!(first.receipt().unwrap().outputs.len(), 2);
    assert_eq!(escrow.balance().await, 1700);

    // 1700 - 1000 - 300 = 400 < 546: one output of 1400
    let second = escrow.engine.release(&escrow.arbiter).await.unwrap();
    assert_eq!(
        amounts(second.receipt().unwrap()),
        vec![(escrow.owner_address(), 1400)]
    );
    assert_eq!(escrow.balance().await, 0);

    let third = escrow.engine.release(&escrow.arbiter).await.unwrap();
    assert_eq!(
        third,
        SettlementOutcome::NothingToSettle {
            action: SettlementAction::Release
        }
    );
}

// =============================================================================
// Scenario: cancel splits 70/30 after the fee
// =============================================================================
#[tokio::test]
async fn e2e_cancel_by_owner() {
    let escrow = Escrow::new(1000);
    escrow.fund(2000);

    let outcome = escrow.engine.cancel(&escrow.owner).await.unwrap();
    let receipt = outcome.receipt().unwrap();
    assert_eq!(receipt.signer_role, Role::Owner);
    assert_eq!(
        amounts(receipt),
        vec![(escrow.owner_address(), 1190), (escrow.arbiter_address(), 510)]
    );
    assert_eq!(escrow.balance().await, 0);

    let subs = escrow.engine.handle().provider().submissions();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].selector, Some(1));
    assert_eq!(subs[0].signer, escrow.owner.identity_hash());
    assert_eq!(
        subs[0].args[0],
        FunctionArg::PublicKey(escrow.owner.public_key_bytes())
    );
}

// =============================================================================
// Scenario: sweep pays everything across several UTXOs
// =============================================================================
#[tokio::test]
async fn e2e_sweep_spends_every_utxo() {
    let escrow = Escrow::new(1000);
    escrow.fund(1200);
    escrow.fund(800);

    let outcome = escrow.engine.sweep(&escrow.arbiter).await.unwrap();
    let receipt = outcome.receipt().unwrap();
    assert_eq!(receipt.balance, 2000);
    assert_eq!(amounts(receipt), vec![(escrow.owner_address(), 1700)]);

    let subs = escrow.engine.handle().provider().submissions();
    assert_eq!(subs[0].inputs.len(), 2);
    assert_eq!(subs[0].args.len(), 2, "sweep takes no fee argument");
    assert_eq!(escrow.balance().await, 0);
}

// =============================================================================
// Scenario: wrong credentials never produce a transaction
// =============================================================================
#[tokio::test]
async fn e2e_unauthorized_callers() {
    let escrow = Escrow::new(1000);
    escrow.fund(2000);
    let stranger = SigningCredential::fixture(0x33);

    for action in SettlementAction::ALL {
        let err = escrow.engine.settle(action, &stranger).await.unwrap_err();
        assert!(
            matches!(err, CommitError::Unauthorized { action: a, .. } if a == action),
            "{action}: {err}"
        );
    }
    assert!(matches!(
        escrow.engine.release(&escrow.owner).await.unwrap_err(),
        CommitError::Unauthorized {
            role: Role::Arbiter,
            ..
        }
    ));

    assert!(escrow.engine.handle().provider().submissions().is_empty());
    assert_eq!(escrow.balance().await, 2000);
}

// =============================================================================
// Scenario: a contract is found again from the same parameters
// =============================================================================
#[tokio::test]
async fn e2e_rederived_contract_sees_same_funds() {
    let first = Escrow::new(1000);
    let second = Escrow::new(1000);
    assert_eq!(
        first.engine.handle().address(),
        second.engine.handle().address()
    );

    let other_claim = Escrow::new(2000);
    assert_ne!(
        first.engine.handle().address(),
        other_claim.engine.handle().address()
    );
}

// =============================================================================
// Scenario: the provider reports outputs that cannot all exist
// =============================================================================
#[tokio::test]
async fn e2e_overflowing_balance_rejected() {
    let escrow = Escrow::new(1000);
    escrow.fund(u64::MAX);
    escrow.fund(2);

    for action in SettlementAction::ALL {
        let credential = match action {
            SettlementAction::Cancel => &escrow.owner,
            _ => &escrow.arbiter,
        };
        let err = escrow.engine.settle(action, credential).await.unwrap_err();
        assert!(
            matches!(err, CommitError::ProviderError { .. }),
            "{action}: {err}"
        );
    }
    assert!(escrow.engine.handle().balance().await.is_err());
    assert!(escrow.engine.handle().provider().submissions().is_empty());
}

// =============================================================================
// Scenario: expiration picked from a chain tip
// =============================================================================
#[test]
fn e2e_expiration_from_tip() {
    use chrono::{Duration, TimeZone, Utc};

    let tip = ChainTip {
        height: 900_000,
        time: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
    };
    let expiration = estimate_height_from_tip(&tip, tip.time + Duration::hours(24));
    assert_eq!(expiration, 900_144);

    let params = CommitmentParameters::new(
        SigningCredential::fixture(1).identity_hash(),
        SigningCredential::fixture(2).identity_hash(),
        expiration,
        1000,
    )
    .unwrap();
    assert_eq!(params.expiration_height(), 900_144);
}
