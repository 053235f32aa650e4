//! Integration test: login to confirmed mint with a real Groth16 proof.
//!
//! 1. Log in through the identity provider; the daemon-side signer attests
//!    the top three artists and stores the record for the session
//! 2. Verify the record's signature against the signer address
//! 3. Prove the commitments with the local BN254 prover
//! 4. Gate on consistency, adapt, and check the adapted call verifies
//! 5. Build metadata and the mint intent, then mint on Base

use chrono::NaiveDate;
use topbadge_attest::provider::login;
use topbadge_attest::{AttestationSigner, MemorySessionStore, SessionId, SessionStore};
use topbadge_crypto::field::{reduce, to_decimal};
use topbadge_crypto::secp256k1::{Address, SigningKey};
use topbadge_integration_tests::{FakeWallet, RecordingChain, ScriptedProvider};
use topbadge_mint::{
    explorer_tx_url, period_label, BadgeMetadata, MintConfig, MintIntent, MintOrchestrator,
    MintState,
};
use topbadge_proof::{adapt, request_proof, LocalProver};
use topbadge_types::{ChainId, ProgramArtifacts};

#[tokio::test]
async fn test_login_prove_adapt_mint() {
    let provider = ScriptedProvider::default();
    provider.script(
        "code-1",
        &["Radiohead", "Boards of Canada", "Aphex Twin", "Autechre", "Burial"],
    );
    let signer = AttestationSigner::new(SigningKey::generate());
    let store = MemorySessionStore::new();
    let session = SessionId::new("cookie-1");

    // 1-2. Attest
    let record = login(&provider, &signer, &store, &session, "code-1")
        .await
        .expect("login");
    assert_eq!(
        record.identities.as_strs(),
        ["Radiohead", "Boards of Canada", "Aphex Twin"]
    );
    record.verify(&signer.address()).expect("signature");
    assert_eq!(store.get(&session).expect("stored"), record);

    // 3-4. Prove and adapt
    let prover = LocalProver::setup().expect("setup");
    let proof = request_proof(&prover, &record, &ProgramArtifacts::default())
        .await
        .expect("consistent proof");
    assert_eq!(
        proof.proof().public_signals[0],
        to_decimal(&reduce("Radiohead"))
    );
    let call = adapt(&proof).expect("adapt");
    assert!(prover.verify_call(&call).expect("verify"));

    // 5. Mint
    let period = period_label(NaiveDate::from_ymd_opt(2025, 3, 1).expect("date"));
    let metadata = BadgeMetadata::new(&record.identities, &period, "ipfs://badge.svg");
    let intent = MintIntent::new(
        &proof,
        record.identities.clone(),
        metadata.token_uri().expect("uri"),
        period.clone(),
    )
    .expect("intent");
    let calldata = intent.calldata();

    let config = MintConfig {
        expected_chain: ChainId::BASE_MAINNET,
        contract: Address([0x99; 20]),
    };
    let mut orch = MintOrchestrator::new(
        FakeWallet::on(ChainId::BASE_MAINNET, true),
        RecordingChain::default(),
        config,
    );
    let receipt = orch.mint(intent).await.expect("mint");
    assert!(matches!(orch.state(), MintState::Confirmed { .. }));

    let sent = orch.chain().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].data, calldata);
    assert_eq!(sent[0].to, config.contract);

    let url = explorer_tx_url(ChainId::BASE_MAINNET, &receipt.tx).expect("explorer");
    assert!(url.starts_with("https://basescan.org/tx/0x"));
    assert_eq!(period, "March 2025");
}

#[tokio::test]
async fn test_forged_identity_order_cannot_reach_the_chain() {
    let provider = ScriptedProvider::default();
    provider.script("code-1", &["Radiohead", "Boards of Canada", "Aphex Twin"]);
    let signer = AttestationSigner::new(SigningKey::generate());
    let store = MemorySessionStore::new();
    let session = SessionId::new("cookie-1");
    let record = login(&provider, &signer, &store, &session, "code-1")
        .await
        .expect("login");

    let prover = LocalProver::setup().expect("setup");
    let proof = request_proof(&prover, &record, &ProgramArtifacts::default())
        .await
        .expect("proof");

    // Same artists, different rank order: the commitments no longer line up.
    let reordered = topbadge_types::IdentityTriple::from_strs(
        "Aphex Twin",
        "Boards of Canada",
        "Radiohead",
    )
    .expect("valid");
    let err = MintIntent::new(&proof, reordered, "uri", "March 2025").expect_err("reordered");
    assert!(matches!(
        &err,
        topbadge_mint::MintError::Proof(e) if e.is_consistency_failure()
    ));
    assert!(!err.is_recoverable());
}
