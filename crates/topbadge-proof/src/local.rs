//! In-process Groth16 prover for the commitment circuit.
//!
//! Mirrors the public interface of the deployed circuit: three public inputs,
//! one per identity commitment, each bound to a private witness. Proofs are
//! emitted in the proving engine's JSON layout so they go through the same
//! consistency gate and adapter as engine proofs.

use std::sync::Arc;

use ark_bn254::{Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_groth16::Proof;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError, Variable};
use ethers_core::types::U256;
use num_bigint::BigUint;
use topbadge_crypto::field::{
    base_field_modulus, base_to_decimal, field_modulus, parse_field_element, to_decimal,
};
use topbadge_crypto::groth16::{self, SerializedProvingKey, SerializedVerifyingKey};
use topbadge_types::{
    CircuitInput, Groth16Proof, ProgramArtifacts, ProofObject, PUBLIC_SIGNAL_COUNT,
};

use crate::adapter::{swap_coordinate_order, CallFormat};
use crate::prover::{Prover, ProverError};
use crate::{ProofError, Result};

/// Knowledge of three witnesses equal to the three public commitments.
#[derive(Clone, Debug, Default)]
pub struct CommitmentCircuit {
    /// `None` during key generation.
    pub commitments: Option<[Fr; PUBLIC_SIGNAL_COUNT]>,
}

impl ConstraintSynthesizer<Fr> for CommitmentCircuit {
    fn generate_constraints(
        self,
        cs: ConstraintSystemRef<Fr>,
    ) -> std::result::Result<(), SynthesisError> {
        for position in 0..PUBLIC_SIGNAL_COUNT {
            let value = || {
                self.commitments
                    .map(|c| c[position])
                    .ok_or(SynthesisError::AssignmentMissing)
            };
            let public = cs.new_input_variable(value)?;
            let witness = cs.new_witness_variable(value)?;
            cs.enforce_constraint(
                ark_relations::lc!() + witness,
                ark_relations::lc!() + Variable::One,
                ark_relations::lc!() + public,
            )?;
        }
        Ok(())
    }
}

/// Groth16 prover with keys held in memory.
///
/// The program artifact paths are ignored; the keys come from [`LocalProver::setup`].
#[derive(Clone)]
pub struct LocalProver {
    proving_key: Arc<SerializedProvingKey>,
    verifying_key: Arc<SerializedVerifyingKey>,
}

impl LocalProver {
    /// Generate development keys for the commitment circuit.
    pub fn setup() -> Result<Self> {
        let (pk, vk) = groth16::setup(CommitmentCircuit::default())?;
        tracing::info!(vk_bytes = vk.bytes.len(), "commitment circuit keys generated");
        Ok(Self {
            proving_key: Arc::new(pk),
            verifying_key: Arc::new(vk),
        })
    }

    pub fn verifying_key(&self) -> &SerializedVerifyingKey {
        &self.verifying_key
    }

    /// Verify a proof in call layout, as the verifier contract would.
    ///
    /// Undoes the G2 coordinate swap, rebuilds the points and checks curve
    /// and subgroup membership. Coordinates or signals outside their field
    /// and points off the curve make the proof invalid rather than an error.
    pub fn verify_call(&self, call: &CallFormat) -> Result<bool> {
        let Some(proof) = decode_call(call) else {
            tracing::debug!("call contains points outside the curve group");
            return Ok(false);
        };

        let r = field_modulus();
        let mut inputs = Vec::with_capacity(PUBLIC_SIGNAL_COUNT);
        for signal in &call.public_signals {
            let value = u256_to_biguint(signal);
            if value >= r {
                return Ok(false);
            }
            inputs.push(Fr::from(value));
        }

        Ok(groth16::verify_decoded(&proof, &self.verifying_key, &inputs)?)
    }
}

impl std::fmt::Debug for LocalProver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalProver")
            .field("vk_bytes", &self.verifying_key.bytes.len())
            .finish_non_exhaustive()
    }
}

impl Prover for LocalProver {
    async fn prove(
        &self,
        input: &CircuitInput,
        artifacts: &ProgramArtifacts,
    ) -> std::result::Result<ProofObject, ProverError> {
        tracing::debug!(zkey = %artifacts.zkey, "proving with in-memory keys");
        let proving_key = Arc::clone(&self.proving_key);
        let verifying_key = Arc::clone(&self.verifying_key);
        let input = input.clone();

        let proof = tokio::task::spawn_blocking(move || {
            prove_blocking(&input, &proving_key, &verifying_key)
        })
        .await??;
        Ok(proof)
    }
}

/// Prove, then check the compressed proof against our own key before it
/// leaves the prover.
fn prove_blocking(
    input: &CircuitInput,
    proving_key: &SerializedProvingKey,
    verifying_key: &SerializedVerifyingKey,
) -> Result<ProofObject> {
    let mut commitments = [Fr::from(0u64); PUBLIC_SIGNAL_COUNT];
    for (slot, value) in commitments.iter_mut().zip(input.as_array()) {
        *slot = parse_field_element(value)?;
    }

    let serialized = groth16::prove(
        CommitmentCircuit {
            commitments: Some(commitments),
        },
        proving_key,
    )?;
    if !groth16::verify(&serialized, verifying_key, &commitments)? {
        tracing::error!("local proof does not verify under its own key");
        return Err(ProofError::Generation(
            "proof failed verification under the local verifying key".to_string(),
        ));
    }
    let proof = groth16::decode_proof(&serialized)?;

    Ok(ProofObject {
        proof: Groth16Proof {
            pi_a: g1_to_engine(&proof.a),
            pi_b: [
                fq2_to_engine(&proof.b.x),
                fq2_to_engine(&proof.b.y),
                ["1".to_string(), "0".to_string()],
            ],
            pi_c: g1_to_engine(&proof.c),
            protocol: "groth16".to_string(),
            curve: "bn128".to_string(),
        },
        public_signals: commitments.iter().map(to_decimal).collect(),
    })
}

fn g1_to_engine(point: &G1Affine) -> [String; 3] {
    [base_to_decimal(&point.x), base_to_decimal(&point.y), "1".to_string()]
}

fn fq2_to_engine(value: &Fq2) -> [String; 2] {
    [base_to_decimal(&value.c0), base_to_decimal(&value.c1)]
}

fn decode_call(call: &CallFormat) -> Option<Proof<ark_bn254::Bn254>> {
    let a = g1_from_call(&call.a)?;
    let c = g1_from_call(&call.c)?;

    let [x, y] = call.b.map(swap_coordinate_order);
    let b = G2Affine::new_unchecked(
        Fq2::new(fq_from_call(&x[0])?, fq_from_call(&x[1])?),
        Fq2::new(fq_from_call(&y[0])?, fq_from_call(&y[1])?),
    );
    if !b.is_on_curve() || !b.is_in_correct_subgroup_assuming_on_curve() {
        return None;
    }

    Some(Proof { a, b, c })
}

fn g1_from_call(point: &[U256; 2]) -> Option<G1Affine> {
    let p = G1Affine::new_unchecked(fq_from_call(&point[0])?, fq_from_call(&point[1])?);
    (p.is_on_curve() && p.is_in_correct_subgroup_assuming_on_curve()).then_some(p)
}

fn fq_from_call(value: &U256) -> Option<Fq> {
    let value = u256_to_biguint(value);
    (value < base_field_modulus()).then(|| Fq::from(value))
}

fn u256_to_biguint(value: &U256) -> BigUint {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    BigUint::from_bytes_be(&bytes)
}
