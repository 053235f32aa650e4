//! Groth16 over BN254 with arkworks.
//!
//! BN254 is the curve the EVM pairing precompiles support, so it is the curve
//! the badge verifier contract checks. Keys and proofs travel in compressed
//! canonical form; [`verify`] is the serialized entry point and
//! [`verify_decoded`] the one for proofs rebuilt from call words.
//!
//! ## Sizes
//!
//! - Compressed proof: 128 bytes (G1 32 + G2 64 + G1 32)

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, ProvingKey, VerifyingKey};
use ark_relations::r1cs::ConstraintSynthesizer;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;

use crate::{CryptoError, Result};

/// Compressed proof size in bytes for Groth16/BN254.
pub const PROOF_SIZE: usize = 128;

/// A compressed Groth16 proof.
#[derive(Clone, Debug)]
pub struct SerializedProof {
    pub bytes: Vec<u8>,
}

/// A compressed verifying key.
#[derive(Clone, Debug)]
pub struct SerializedVerifyingKey {
    pub bytes: Vec<u8>,
}

/// A compressed proving key.
#[derive(Clone, Debug)]
pub struct SerializedProvingKey {
    pub bytes: Vec<u8>,
}

fn to_bytes<T: CanonicalSerialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(value.compressed_size());
    value
        .serialize_compressed(&mut bytes)
        .map_err(|e| CryptoError::Serialization(e.to_string()))?;
    Ok(bytes)
}

fn from_bytes<T: CanonicalDeserialize>(bytes: &[u8]) -> Result<T> {
    T::deserialize_compressed(bytes).map_err(|e| CryptoError::Serialization(e.to_string()))
}

/// Circuit-specific key generation with local randomness.
///
/// Development keys only; deployed circuits use ceremony keys.
pub fn setup<C: ConstraintSynthesizer<Fr>>(
    circuit: C,
) -> Result<(SerializedProvingKey, SerializedVerifyingKey)> {
    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, &mut rand::rngs::OsRng)
        .map_err(|e| CryptoError::Proof(e.to_string()))?;

    Ok((
        SerializedProvingKey { bytes: to_bytes(&pk)? },
        SerializedVerifyingKey { bytes: to_bytes(&vk)? },
    ))
}

/// Prove `circuit` with a compressed proving key.
pub fn prove<C: ConstraintSynthesizer<Fr>>(
    circuit: C,
    proving_key: &SerializedProvingKey,
) -> Result<SerializedProof> {
    let pk: ProvingKey<Bn254> = from_bytes(&proving_key.bytes)?;
    let proof = Groth16::<Bn254>::prove(&pk, circuit, &mut rand::rngs::OsRng)
        .map_err(|e| CryptoError::Proof(e.to_string()))?;
    encode_proof(&proof)
}

/// Check a compressed proof against `public_inputs`, in circuit order.
pub fn verify(
    proof: &SerializedProof,
    verifying_key: &SerializedVerifyingKey,
    public_inputs: &[Fr],
) -> Result<bool> {
    verify_decoded(&decode_proof(proof)?, verifying_key, public_inputs)
}

/// [`verify`] for a proof that is already a curve-point triple.
pub fn verify_decoded(
    proof: &Proof<Bn254>,
    verifying_key: &SerializedVerifyingKey,
    public_inputs: &[Fr],
) -> Result<bool> {
    let vk: VerifyingKey<Bn254> = from_bytes(&verifying_key.bytes)?;
    Groth16::<Bn254>::verify_with_processed_vk(&PreparedVerifyingKey::from(vk), public_inputs, proof)
        .map_err(|e| CryptoError::Proof(e.to_string()))
}

pub fn encode_proof(proof: &Proof<Bn254>) -> Result<SerializedProof> {
    Ok(SerializedProof {
        bytes: to_bytes(proof)?,
    })
}

/// Decode a compressed proof; points off the curve or subgroup are rejected.
pub fn decode_proof(proof: &SerializedProof) -> Result<Proof<Bn254>> {
    from_bytes(&proof.bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError, Variable};

    /// Knowledge of a witness equal to one public commitment.
    #[derive(Clone)]
    struct OpeningCircuit {
        commitment: Option<Fr>,
    }

    impl ConstraintSynthesizer<Fr> for OpeningCircuit {
        fn generate_constraints(
            self,
            cs: ConstraintSystemRef<Fr>,
        ) -> std::result::Result<(), SynthesisError> {
            let value = || self.commitment.ok_or(SynthesisError::AssignmentMissing);
            let public = cs.new_input_variable(value)?;
            let witness = cs.new_witness_variable(value)?;
            cs.enforce_constraint(
                ark_relations::lc!() + witness,
                ark_relations::lc!() + Variable::One,
                ark_relations::lc!() + public,
            )?;
            Ok(())
        }
    }

    fn keys() -> (SerializedProvingKey, SerializedVerifyingKey) {
        setup(OpeningCircuit { commitment: None }).expect("setup")
    }

    fn open(pk: &SerializedProvingKey, commitment: u64) -> SerializedProof {
        prove(
            OpeningCircuit {
                commitment: Some(Fr::from(commitment)),
            },
            pk,
        )
        .expect("prove")
    }

    #[test]
    fn test_opening_verifies() {
        let (pk, vk) = keys();
        let proof = open(&pk, 8453);
        assert!(verify(&proof, &vk, &[Fr::from(8453u64)]).expect("verify"));
    }

    #[test]
    fn test_other_commitment_fails() {
        let (pk, vk) = keys();
        let proof = open(&pk, 8453);
        assert!(!verify(&proof, &vk, &[Fr::from(8454u64)]).expect("verify"));
    }

    #[test]
    fn test_foreign_verifying_key_fails() {
        let (pk, _) = keys();
        let (_, other_vk) = keys();
        let proof = open(&pk, 7);
        assert!(!verify(&proof, &other_vk, &[Fr::from(7u64)]).expect("verify"));
    }

    #[test]
    fn test_compressed_proof_size_and_decode() {
        let (pk, vk) = keys();
        let proof = open(&pk, 42);
        assert_eq!(proof.bytes.len(), PROOF_SIZE);

        let decoded = decode_proof(&proof).expect("decode");
        assert_eq!(encode_proof(&decoded).expect("encode").bytes, proof.bytes);
        assert!(verify_decoded(&decoded, &vk, &[Fr::from(42u64)]).expect("verify"));
    }

    #[test]
    fn test_truncated_proof_rejected() {
        let (pk, vk) = keys();
        let proof = open(&pk, 1);
        let truncated = SerializedProof {
            bytes: proof.bytes[..PROOF_SIZE - 1].to_vec(),
        };
        assert!(decode_proof(&truncated).is_err());
        assert!(verify(&truncated, &vk, &[Fr::from(1u64)]).is_err());
    }
}
