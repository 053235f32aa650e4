//! Test vector generator for the badge pipeline.
//!
//! Generates `test_vectors.json` with the commitment, digest, signature and
//! call-layout vectors the web client and the contracts are checked against.
//!
//! Usage:
//!   topbadge-testvec              # Generate test_vectors.json
//!   topbadge-testvec --verify     # Verify test vectors match expected values

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use topbadge_attest::record::attestation_digest;
use topbadge_crypto::field::{reduce, to_decimal, FIELD_PRIME};
use topbadge_crypto::keccak::{eth_message_hash, keccak256};
use topbadge_crypto::secp256k1::SigningKey;
use topbadge_types::{Groth16Proof, IdentityTriple, ProofObject};

const FIXTURE: [&str; 3] = ["Radiohead", "Boards of Canada", "Aphex Twin"];
const VECTORS_PATH: &str = "tests/fixtures/test_vectors.json";

#[derive(Serialize, Deserialize)]
struct TestVectors {
    version: String,
    generated_by: String,
    vectors: BTreeMap<String, TestVector>,
}

#[derive(Serialize, Deserialize)]
struct TestVector {
    description: String,
    inputs: BTreeMap<String, String>,
    outputs: BTreeMap<String, String>,
}

fn fixture() -> anyhow::Result<IdentityTriple> {
    let [a, b, c] = FIXTURE;
    Ok(IdentityTriple::from_strs(a, b, c)?)
}

fn generate_keccak_vectors() -> BTreeMap<String, TestVector> {
    let mut vectors = BTreeMap::new();

    vectors.insert(
        "keccak256_empty".to_string(),
        TestVector {
            description: "keccak256(\"\")".to_string(),
            inputs: BTreeMap::from([("data".to_string(), String::new())]),
            outputs: BTreeMap::from([("hash".to_string(), hex::encode(keccak256(b"")))]),
        },
    );

    for (i, name) in FIXTURE.iter().enumerate() {
        vectors.insert(
            format!("keccak256_fixture_{}", i + 1),
            TestVector {
                description: format!("keccak256(utf8({name:?}))"),
                inputs: BTreeMap::from([("data".to_string(), name.to_string())]),
                outputs: BTreeMap::from([(
                    "hash".to_string(),
                    hex::encode(keccak256(name.as_bytes())),
                )]),
            },
        );
    }

    vectors
}

fn generate_commitment_vectors() -> BTreeMap<String, TestVector> {
    let mut vectors = BTreeMap::new();

    let mut outputs = BTreeMap::new();
    for (i, name) in FIXTURE.iter().enumerate() {
        outputs.insert(format!("artist{}Hash", i + 1), to_decimal(&reduce(name)));
    }
    vectors.insert(
        "commitments_fixture".to_string(),
        TestVector {
            description: "keccak256(utf8(trim(s))) mod r for the fixture triple".to_string(),
            inputs: BTreeMap::from([
                ("identities".to_string(), FIXTURE.join(" | ")),
                ("field_prime".to_string(), FIELD_PRIME.to_string()),
            ]),
            outputs,
        },
    );

    vectors.insert(
        "commitment_trims_whitespace".to_string(),
        TestVector {
            description: "reduce(\"  Aphex Twin\\n\") == reduce(\"Aphex Twin\")".to_string(),
            inputs: BTreeMap::from([("identity".to_string(), "  Aphex Twin\n".to_string())]),
            outputs: BTreeMap::from([(
                "commitment".to_string(),
                to_decimal(&reduce("  Aphex Twin\n")),
            )]),
        },
    );

    vectors
}

fn generate_attestation_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();
    let identities = fixture()?;

    let digest = attestation_digest(&identities);
    let message_hash = eth_message_hash(&digest);
    vectors.insert(
        "attestation_digest_fixture".to_string(),
        TestVector {
            description: "keccak256(abi.encode(a1, a2, a3)) and its EIP-191 hash".to_string(),
            inputs: BTreeMap::from([("identities".to_string(), FIXTURE.join(" | "))]),
            outputs: BTreeMap::from([
                ("digest".to_string(), hex::encode(digest)),
                ("eth_message_hash".to_string(), hex::encode(message_hash)),
            ]),
        },
    );

    // RFC 6979 nonces make this signature stable.
    let mut secret = [0u8; 32];
    secret[31] = 1;
    let key = SigningKey::from_bytes(&secret)?;
    let signature = key.sign_message(&digest)?;
    vectors.insert(
        "attestation_signature_fixture".to_string(),
        TestVector {
            description: "EIP-191 signature of the fixture digest with secret key 0x00..01"
                .to_string(),
            inputs: BTreeMap::from([
                ("secret_key".to_string(), hex::encode(secret)),
                ("digest".to_string(), hex::encode(digest)),
            ]),
            outputs: BTreeMap::from([
                ("address".to_string(), key.address().to_string()),
                ("signature".to_string(), signature.to_string()),
            ]),
        },
    );

    Ok(vectors)
}

fn generate_adapter_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();
    let (_, expected) = topbadge_proof::build_inputs_for(&fixture()?);

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
    let checked = topbadge_proof::check_consistency(proof, &expected)?;
    let call = topbadge_proof::adapt(&checked)?;

    let b: Vec<String> = call
        .b
        .iter()
        .map(|row| format!("[{}, {}]", row[0], row[1]))
        .collect();
    vectors.insert(
        "adapter_swaps_g2_rows".to_string(),
        TestVector {
            description: "pi_b [[x0, x1], [y0, y1]] becomes b [[x1, x0], [y1, y0]]".to_string(),
            inputs: BTreeMap::from([("pi_b".to_string(), "[[3, 4], [5, 6], [1, 0]]".to_string())]),
            outputs: BTreeMap::from([
                ("a".to_string(), format!("[{}, {}]", call.a[0], call.a[1])),
                ("b".to_string(), format!("[{}]", b.join(", "))),
                ("c".to_string(), format!("[{}, {}]", call.c[0], call.c[1])),
            ]),
        },
    );

    let selector = ethers_core::utils::id(topbadge_mint::intent::MINT_SIGNATURE);
    vectors.insert(
        "mint_badge_selector".to_string(),
        TestVector {
            description: "4-byte selector of the mint entry point".to_string(),
            inputs: BTreeMap::from([(
                "signature".to_string(),
                topbadge_mint::intent::MINT_SIGNATURE.to_string(),
            )]),
            outputs: BTreeMap::from([("selector".to_string(), hex::encode(selector))]),
        },
    );

    Ok(vectors)
}

fn generate_all_vectors() -> anyhow::Result<TestVectors> {
    let mut all_vectors = BTreeMap::new();

    all_vectors.extend(generate_keccak_vectors());
    all_vectors.extend(generate_commitment_vectors());
    all_vectors.extend(generate_attestation_vectors()?);
    all_vectors.extend(generate_adapter_vectors()?);

    Ok(TestVectors {
        version: "1.0".to_string(),
        generated_by: "topbadge-testvec".to_string(),
        vectors: all_vectors,
    })
}

fn verify_vectors(vectors: &TestVectors) -> anyhow::Result<bool> {
    let regenerated = generate_all_vectors()?;
    let mut all_pass = true;

    for (name, expected) in &vectors.vectors {
        if let Some(actual) = regenerated.vectors.get(name) {
            if actual.outputs != expected.outputs {
                eprintln!("FAIL: {name}");
                eprintln!("  expected: {:?}", expected.outputs);
                eprintln!("  actual:   {:?}", actual.outputs);
                all_pass = false;
            } else {
                eprintln!("PASS: {name}");
            }
        } else {
            eprintln!("MISSING: {name}");
            all_pass = false;
        }
    }

    Ok(all_pass)
}

fn write_vectors(vectors: &TestVectors) -> anyhow::Result<()> {
    if let Some(parent) = std::path::Path::new(VECTORS_PATH).parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(VECTORS_PATH, serde_json::to_string_pretty(vectors)?)?;
    eprintln!("Generated {} test vectors to {VECTORS_PATH}", vectors.vectors.len());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let verify = std::env::args().any(|a| a == "--verify");

    let vectors = match std::fs::read_to_string(VECTORS_PATH) {
        Ok(content) if verify => serde_json::from_str(&content)?,
        _ => {
            if verify {
                eprintln!("No existing test vectors found at {VECTORS_PATH}. Generating...");
            }
            let vectors = generate_all_vectors()?;
            write_vectors(&vectors)?;
            vectors
        }
    };

    if verify_vectors(&vectors)? {
        eprintln!("All test vectors verified successfully.");
        Ok(())
    } else {
        anyhow::bail!("test vector verification failed")
    }
}
