//! Proof to verifier-call adapter.
//!
//! The proving engine emits G2 coordinates as `[c0, c1]`; the verifier
//! contract (and the EVM pairing precompile) expects `[c1, c0]`. G1 points
//! keep their order. The projective `z` coordinates are dropped after
//! checking they are the affine markers `"1"` and `["1", "0"]`.

use ethers_core::types::U256;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use topbadge_crypto::field::{base_field_modulus, field_modulus, parse_decimal_below};
use topbadge_types::PUBLIC_SIGNAL_COUNT;

use crate::request::ConsistentProof;
use crate::{ProofError, Result};

/// Proof in the argument layout of the verifier call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFormat {
    pub a: [U256; 2],
    pub b: [[U256; 2]; 2],
    pub c: [U256; 2],
    pub public_signals: [U256; PUBLIC_SIGNAL_COUNT],
}

/// Reverse the two components of an extension-field coordinate.
///
/// Applying it twice gives the input back.
pub fn swap_coordinate_order<T>(pair: [T; 2]) -> [T; 2] {
    let [c0, c1] = pair;
    [c1, c0]
}

/// Reshape a consistent proof into call layout.
///
/// # Errors
///
/// Returns [`ProofError::MalformedProof`] when the protocol, curve or `z`
/// coordinates are not the expected affine Groth16/BN254 form, and
/// [`ProofError::InvalidElement`] when a coordinate is not below the base
/// field prime or a public signal is not below the scalar field prime.
pub fn adapt(proof: &ConsistentProof) -> Result<CallFormat> {
    let object = proof.proof();
    let raw = &object.proof;

    if raw.protocol != "groth16" {
        return Err(ProofError::MalformedProof(format!(
            "unsupported protocol {:?}",
            raw.protocol
        )));
    }
    if raw.curve != "bn128" {
        return Err(ProofError::MalformedProof(format!(
            "unsupported curve {:?}",
            raw.curve
        )));
    }

    let q = base_field_modulus();

    let a = g1(&raw.pi_a, &q, "pi_a")?;
    let c = g1(&raw.pi_c, &q, "pi_c")?;

    let [x, y, z] = &raw.pi_b;
    if z[0] != "1" || z[1] != "0" {
        return Err(ProofError::MalformedProof(format!(
            "pi_b is not affine: z = {z:?}"
        )));
    }
    let b = [
        swap_coordinate_order([coordinate(&x[0], &q)?, coordinate(&x[1], &q)?]),
        swap_coordinate_order([coordinate(&y[0], &q)?, coordinate(&y[1], &q)?]),
    ];

    let r = field_modulus();
    let signals = object
        .public_signals
        .iter()
        .map(|s| coordinate(s, &r))
        .collect::<Result<Vec<_>>>()?;
    let public_signals: [U256; PUBLIC_SIGNAL_COUNT] =
        signals.try_into().map_err(|v: Vec<U256>| ProofError::SignalCount {
            expected: PUBLIC_SIGNAL_COUNT,
            actual: v.len(),
        })?;

    Ok(CallFormat {
        a,
        b,
        c,
        public_signals,
    })
}

fn g1(point: &[String; 3], q: &BigUint, name: &str) -> Result<[U256; 2]> {
    let [x, y, z] = point;
    if z != "1" {
        return Err(ProofError::MalformedProof(format!(
            "{name} is not affine: z = {z:?}"
        )));
    }
    Ok([coordinate(x, q)?, coordinate(y, q)?])
}

fn coordinate(value: &str, modulus: &BigUint) -> Result<U256> {
    let parsed = parse_decimal_below(value, modulus)?;
    Ok(U256::from_big_endian(&parsed.to_bytes_be()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{build_inputs_for, check_consistency};
    use topbadge_crypto::field::{BASE_FIELD_PRIME, FIELD_PRIME};
    use topbadge_types::{Groth16Proof, IdentityTriple, ProofObject};

    fn consistent(proof: Groth16Proof) -> ConsistentProof {
        let identities =
            IdentityTriple::from_strs("Radiohead", "Boards of Canada", "Aphex Twin").expect("valid");
        let (_, expected) = build_inputs_for(&identities);
        check_consistency(
            ProofObject {
                proof,
                public_signals: expected.to_decimal().to_vec(),
            },
            &expected,
        )
        .expect("consistent")
    }

    fn engine_proof() -> Groth16Proof {
        Groth16Proof {
            pi_a: ["1".into(), "2".into(), "1".into()],
            pi_b: [
                ["3".into(), "4".into()],
                ["5".into(), "6".into()],
                ["1".into(), "0".into()],
            ],
            pi_c: ["7".into(), "8".into(), "1".into()],
            protocol: "groth16".into(),
            curve: "bn128".into(),
        }
    }

    #[test]
    fn test_g2_rows_are_swapped() {
        let call = adapt(&consistent(engine_proof())).expect("adapt");
        assert_eq!(call.a, [U256::from(1), U256::from(2)]);
        assert_eq!(
            call.b,
            [
                [U256::from(4), U256::from(3)],
                [U256::from(6), U256::from(5)]
            ]
        );
        assert_eq!(call.c, [U256::from(7), U256::from(8)]);
    }

    #[test]
    fn test_public_signals_preserved_in_order() {
        let proof = consistent(engine_proof());
        let call = adapt(&proof).expect("adapt");
        for (signal, decimal) in call.public_signals.iter().zip(proof.commitments().to_decimal()) {
            assert_eq!(signal, &U256::from_dec_str(&decimal).expect("decimal"));
        }
    }

    #[test]
    fn test_swap_is_an_involution() {
        let pair = ["a", "b"];
        assert_eq!(swap_coordinate_order(pair), ["b", "a"]);
        assert_eq!(swap_coordinate_order(swap_coordinate_order(pair)), pair);
    }

    #[test]
    fn test_coordinate_at_base_prime_rejected() {
        let mut proof = engine_proof();
        proof.pi_c[1] = BASE_FIELD_PRIME.into();
        let err = adapt(&consistent(proof)).expect_err("q is out of range");
        assert!(matches!(err, ProofError::InvalidElement(_)));
    }

    #[test]
    fn test_coordinate_between_primes_accepted() {
        // r <= value < q is a valid coordinate even though it is not a scalar.
        let mut proof = engine_proof();
        proof.pi_a[0] = FIELD_PRIME.into();
        assert!(adapt(&consistent(proof)).is_ok());
    }

    #[test]
    fn test_non_affine_points_rejected() {
        let mut proof = engine_proof();
        proof.pi_a[2] = "2".into();
        assert!(matches!(
            adapt(&consistent(proof)),
            Err(ProofError::MalformedProof(_))
        ));

        let mut proof = engine_proof();
        proof.pi_b[2] = ["0".into(), "1".into()];
        assert!(matches!(
            adapt(&consistent(proof)),
            Err(ProofError::MalformedProof(_))
        ));
    }

    #[test]
    fn test_unknown_curve_rejected() {
        let mut proof = engine_proof();
        proof.curve = "bls12381".into();
        assert!(matches!(
            adapt(&consistent(proof)),
            Err(ProofError::MalformedProof(_))
        ));
    }
}
