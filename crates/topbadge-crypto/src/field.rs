//! String to field-element reduction on the BN254 scalar field.
//!
//! Every identity string becomes a public proof input through
//! `keccak256(utf8(trim(s))) mod r`, where `r` is the BN254 scalar field
//! order. The web client, the backend and the test vectors must all compute
//! this identically, so it lives here and nowhere else.
//!
//! Field elements cross process boundaries as decimal strings, which is the
//! representation the proving engine uses for inputs and public signals.

use ark_bn254::{Fq, Fr};
use ark_ff::PrimeField;
use num_bigint::BigUint;

use crate::keccak::keccak256;
use crate::{CryptoError, Result};

/// An element of the BN254 scalar field.
pub type FieldElement = Fr;

/// Decimal form of the scalar field order `r`.
pub const FIELD_PRIME: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// Decimal form of the base field order `q`, which bounds curve coordinates.
pub const BASE_FIELD_PRIME: &str =
    "21888242871839275222246405745257275088696311157297823662689037894645226208583";

/// The scalar field order as a big integer.
pub fn field_modulus() -> BigUint {
    BigUint::from(Fr::MODULUS)
}

/// The base field order as a big integer.
pub fn base_field_modulus() -> BigUint {
    BigUint::from(Fq::MODULUS)
}

/// Reduce an identity string to a field element.
///
/// Surrounding whitespace is trimmed before hashing. The hash is read as a
/// big-endian integer and reduced modulo `r`.
pub fn reduce(identity: &str) -> FieldElement {
    let digest = keccak256(identity.trim().as_bytes());
    Fr::from_be_bytes_mod_order(&digest)
}

/// Render a scalar field element as canonical decimal.
pub fn to_decimal(element: &FieldElement) -> String {
    BigUint::from(element.into_bigint()).to_string()
}

/// Render a base field element as canonical decimal.
pub fn base_to_decimal(element: &Fq) -> String {
    BigUint::from(element.into_bigint()).to_string()
}

/// Parse an unsigned decimal string into a big integer.
///
/// Only ASCII digits are accepted; signs, separators and whitespace are
/// rejected rather than normalized.
pub fn parse_decimal(value: &str) -> Result<BigUint> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CryptoError::MalformedFieldElement(value.to_string()));
    }
    BigUint::parse_bytes(value.as_bytes(), 10)
        .ok_or_else(|| CryptoError::MalformedFieldElement(value.to_string()))
}

/// Parse a decimal string that must be strictly below `modulus`.
pub fn parse_decimal_below(value: &str, modulus: &BigUint) -> Result<BigUint> {
    let parsed = parse_decimal(value)?;
    if &parsed >= modulus {
        return Err(CryptoError::FieldOverflow {
            value: value.to_string(),
        });
    }
    Ok(parsed)
}

/// Parse a canonical decimal scalar field element.
///
/// Values at or above `r` are rejected instead of being reduced.
pub fn parse_field_element(value: &str) -> Result<FieldElement> {
    let parsed = parse_decimal_below(value, &field_modulus())?;
    Ok(Fr::from(parsed))
}

/// Parse a canonical decimal base field element.
pub fn parse_base_element(value: &str) -> Result<Fq> {
    let parsed = parse_decimal_below(value, &base_field_modulus())?;
    Ok(Fq::from(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_modulus_constants_match_curve() {
        assert_eq!(field_modulus().to_string(), FIELD_PRIME);
        assert_eq!(base_field_modulus().to_string(), BASE_FIELD_PRIME);
    }

    #[test]
    fn test_reduce_matches_manual_reduction() {
        let digest = keccak256(b"Radiohead");
        let expected = BigUint::from_bytes_be(&digest) % field_modulus();
        assert_eq!(to_decimal(&reduce("Radiohead")), expected.to_string());
    }

    #[test]
    fn test_reduce_ignores_surrounding_whitespace() {
        assert_eq!(reduce("Aphex Twin"), reduce("  Aphex Twin\n"));
        assert_eq!(reduce("Aphex Twin"), reduce("\tAphex Twin "));
    }

    #[test]
    fn test_reduce_keeps_inner_whitespace_and_case() {
        assert_ne!(reduce("Aphex Twin"), reduce("AphexTwin"));
        assert_ne!(reduce("Aphex Twin"), reduce("aphex twin"));
    }

    #[test]
    fn test_decimal_roundtrip() {
        let element = reduce("Boards of Canada");
        let decimal = to_decimal(&element);
        assert_eq!(parse_field_element(&decimal).expect("parse"), element);
    }

    #[test]
    fn test_zero_renders_as_zero() {
        assert_eq!(to_decimal(&Fr::from(0u64)), "0");
        assert_eq!(parse_field_element("0").expect("zero"), Fr::from(0u64));
    }

    #[test]
    fn test_prime_is_rejected() {
        let err = parse_field_element(FIELD_PRIME).expect_err("p is out of range");
        assert!(matches!(err, CryptoError::FieldOverflow { .. }));
    }

    #[test]
    fn test_prime_minus_one_accepted() {
        let max = field_modulus() - 1u32;
        assert!(parse_field_element(&max.to_string()).is_ok());
    }

    #[test]
    fn test_scalar_prime_fits_base_field() {
        // r < q, so every scalar is a valid base field value but not vice versa.
        assert!(parse_base_element(FIELD_PRIME).is_ok());
        assert!(parse_base_element(BASE_FIELD_PRIME).is_err());
    }

    #[test]
    fn test_malformed_decimal_rejected() {
        for bad in ["", "-1", "1_000", "0x10", " 12", "12 ", "1e5"] {
            assert!(
                matches!(parse_decimal(bad), Err(CryptoError::MalformedFieldElement(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    proptest! {
        #[test]
        fn prop_reduce_deterministic_and_in_range(s in "\\PC{1,40}") {
            let a = reduce(&s);
            let b = reduce(&s);
            prop_assert_eq!(a, b);
            let value = BigUint::from(a.into_bigint());
            prop_assert!(value < field_modulus());
        }

        #[test]
        fn prop_reduce_trim_invariant(s in "[a-zA-Z0-9 ]{1,30}", pad in "[ \\t\\n]{0,4}") {
            let padded = format!("{pad}{s}{pad}");
            prop_assert_eq!(reduce(&s), reduce(&padded));
        }
    }
}
