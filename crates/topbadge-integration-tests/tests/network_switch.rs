//! Integration test: the orchestrator never submits on the wrong network.

use topbadge_crypto::secp256k1::Address;
use topbadge_integration_tests::{FakeWallet, RecordingChain};
use topbadge_mint::{MintConfig, MintError, MintIntent, MintOrchestrator, MintState};
use topbadge_proof::{build_inputs_for, check_consistency};
use topbadge_types::{ChainId, Groth16Proof, IdentityTriple, ProofObject};

const CONFIG: MintConfig = MintConfig {
    expected_chain: ChainId::BASE_MAINNET,
    contract: Address([0x42; 20]),
};

/// A structurally valid intent; the fakes do not verify the pairing.
fn intent() -> MintIntent {
    let identities =
        IdentityTriple::from_strs("Radiohead", "Boards of Canada", "Aphex Twin").expect("valid");
    let (_, expected) = build_inputs_for(&identities);
    let proof = ProofObject {
        proof: Groth16Proof {
            pi_a: ["1".into(), "2".into(), "1".into()],
            pi_b: [
                ["3".into(), "4".into()],
                ["5".into(), "6".into()],
                ["1".into(), "0".into()],
            ],
            pi_c: ["7".into(), "8".into(), "1".into()],
            protocol: "groth16".into(),
            curve: "bn128".into(),
        },
        public_signals: expected.to_decimal().to_vec(),
    };
    let checked = check_consistency(proof, &expected).expect("consistent");
    MintIntent::new(&checked, identities, "data:application/json;base64,e30=", "March 2025")
        .expect("intent")
}

#[tokio::test]
async fn test_refused_switch_sends_nothing() {
    let mut orch = MintOrchestrator::new(
        FakeWallet::on(ChainId::ETHEREUM, false),
        RecordingChain::default(),
        CONFIG,
    );

    let err = orch.mint(intent()).await.expect_err("refused switch");
    assert!(matches!(
        err,
        MintError::NetworkMismatch {
            expected: ChainId::BASE_MAINNET,
            actual: ChainId::ETHEREUM,
        }
    ));
    assert!(err.is_recoverable());
    assert_eq!(orch.state(), &MintState::ProofReady);
    assert_eq!(orch.wallet().switch_requests(), 1);
    assert!(orch.chain().sent().is_empty());

    // Submitting directly is still refused.
    assert!(matches!(
        orch.submit().await,
        Err(MintError::InvalidState { .. })
    ));
    assert!(orch.chain().sent().is_empty());
}

#[tokio::test]
async fn test_accepted_switch_proceeds_to_confirmation() {
    let mut orch = MintOrchestrator::new(
        FakeWallet::on(ChainId::ETHEREUM, true),
        RecordingChain::default(),
        CONFIG,
    );

    orch.mint(intent()).await.expect("mint after switch");
    assert!(matches!(orch.state(), MintState::Confirmed { .. }));
    assert_eq!(orch.wallet().switch_requests(), 1);

    let sent = orch.chain().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chain_id, ChainId::BASE_MAINNET);
}

#[tokio::test]
async fn test_already_on_expected_chain_skips_switch() {
    let mut orch = MintOrchestrator::new(
        FakeWallet::on(ChainId::BASE_MAINNET, false),
        RecordingChain::default(),
        CONFIG,
    );

    orch.mint(intent()).await.expect("mint");
    assert_eq!(orch.wallet().switch_requests(), 0);
    assert_eq!(orch.chain().sent().len(), 1);
}
