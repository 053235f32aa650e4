//! Proof request builder and the public-signal consistency gate.
//!
//! The commitments are recomputed here from the attested identities, never
//! taken from the proof. A proof whose public signals differ from them, in
//! value or in order, is either stale (the session re-logged since it was
//! made) or substituted, and is dropped before adaptation.

use ark_bn254::Fr;
use topbadge_attest::AttestationRecord;
use topbadge_crypto::field::{parse_field_element, reduce, to_decimal};
use topbadge_types::{
    CircuitInput, IdentityTriple, ProgramArtifacts, ProofObject, PUBLIC_SIGNAL_COUNT,
};

use crate::prover::Prover;
use crate::{ProofError, Result};

/// The three commitments a proof must expose, in circuit order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpectedCommitments(pub [Fr; PUBLIC_SIGNAL_COUNT]);

impl ExpectedCommitments {
    /// `reduce(identity_i)` for each identity, in rank order.
    pub fn from_identities(identities: &IdentityTriple) -> Self {
        Self(identities.as_strs().map(reduce))
    }

    /// Commitments as decimal strings.
    pub fn to_decimal(&self) -> [String; PUBLIC_SIGNAL_COUNT] {
        self.0.map(|c| to_decimal(&c))
    }
}

/// A proof whose public signals equal the attested commitments.
///
/// Only [`check_consistency`] constructs this type, so anything downstream
/// that takes a `ConsistentProof` cannot see an unchecked proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsistentProof {
    proof: ProofObject,
    commitments: ExpectedCommitments,
}

impl ConsistentProof {
    /// The checked proof object.
    pub fn proof(&self) -> &ProofObject {
        &self.proof
    }

    /// The commitments the public signals were checked against.
    pub fn commitments(&self) -> &ExpectedCommitments {
        &self.commitments
    }

    /// Give back the proof object.
    pub fn into_inner(self) -> ProofObject {
        self.proof
    }
}

/// Circuit inputs and expected commitments for the record's identities.
pub fn build_inputs(record: &AttestationRecord) -> (CircuitInput, ExpectedCommitments) {
    build_inputs_for(&record.identities)
}

/// [`build_inputs`] from a bare identity triple.
pub fn build_inputs_for(identities: &IdentityTriple) -> (CircuitInput, ExpectedCommitments) {
    let expected = ExpectedCommitments::from_identities(identities);
    let [artist1_hash, artist2_hash, artist3_hash] = expected.to_decimal();

    tracing::debug!(
        artist1_hash = %artist1_hash,
        artist2_hash = %artist2_hash,
        artist3_hash = %artist3_hash,
        "built circuit inputs"
    );

    (
        CircuitInput {
            artist1_hash,
            artist2_hash,
            artist3_hash,
        },
        expected,
    )
}

/// Compare a proof's public signals with the expected commitments.
///
/// Signals must be canonical decimals below the field prime, exactly
/// [`PUBLIC_SIGNAL_COUNT`] of them, equal position by position.
pub fn check_consistency(
    proof: ProofObject,
    expected: &ExpectedCommitments,
) -> Result<ConsistentProof> {
    if proof.public_signals.len() != PUBLIC_SIGNAL_COUNT {
        let err = ProofError::SignalCount {
            expected: PUBLIC_SIGNAL_COUNT,
            actual: proof.public_signals.len(),
        };
        tracing::error!(error = %err, "proof rejected");
        return Err(err);
    }

    for (position, (signal, commitment)) in proof
        .public_signals
        .iter()
        .zip(expected.0.iter())
        .enumerate()
    {
        let value = parse_field_element(signal).inspect_err(|e| {
            tracing::error!(position, error = %e, "proof rejected: non-canonical public signal");
        })?;
        if value != *commitment {
            let err = ProofError::Consistency {
                position,
                expected: to_decimal(commitment),
                actual: signal.clone(),
            };
            tracing::error!(error = %err, "proof rejected");
            return Err(err);
        }
    }

    Ok(ConsistentProof {
        proof,
        commitments: *expected,
    })
}

/// Build inputs, run the prover, and gate the result on consistency.
pub async fn request_proof<P: Prover>(
    prover: &P,
    record: &AttestationRecord,
    artifacts: &ProgramArtifacts,
) -> Result<ConsistentProof> {
    let (input, expected) = build_inputs(record);

    let proof = prover.prove(&input, artifacts).await.map_err(|e| {
        tracing::warn!(error = %e, "proving engine failed");
        ProofError::Generation(e.to_string())
    })?;

    let checked = check_consistency(proof, &expected)?;
    tracing::info!("proof generated and matches attested commitments");
    Ok(checked)
}
