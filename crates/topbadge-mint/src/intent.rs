//! Mint intent and `mintBadge` calldata.

use ethers_core::abi::{encode, Token};
use ethers_core::types::U256;
use topbadge_crypto::keccak::keccak256;
use topbadge_proof::{adapt, CallFormat, ConsistentProof, ExpectedCommitments, ProofError};
use topbadge_types::IdentityTriple;

use crate::Result;

/// Solidity signature of the badge contract's mint entry point.
pub const MINT_SIGNATURE: &str =
    "mintBadge(uint256[2],uint256[2][2],uint256[2],uint256[3],string,string,string,string,string)";

/// Everything one mint attempt submits.
///
/// Built per attempt from a fresh consistent proof and dropped once the
/// attempt is confirmed or fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintIntent {
    pub call: CallFormat,
    pub identities: IdentityTriple,
    pub token_uri: String,
    pub period: String,
}

impl MintIntent {
    /// Adapt `proof` and pair it with the identities it commits to.
    ///
    /// # Errors
    ///
    /// Fails with [`ProofError::Consistency`] if `identities` are not the
    /// identities the proof was checked against, or with any adapter error.
    pub fn new(
        proof: &ConsistentProof,
        identities: IdentityTriple,
        token_uri: impl Into<String>,
        period: impl Into<String>,
    ) -> Result<Self> {
        let clear = ExpectedCommitments::from_identities(&identities);
        let committed = proof.commitments();
        if let Some(position) = (0..clear.0.len()).find(|&i| clear.0[i] != committed.0[i]) {
            let err = ProofError::Consistency {
                position,
                expected: committed.to_decimal()[position].clone(),
                actual: clear.to_decimal()[position].clone(),
            };
            tracing::error!(error = %err, "identities do not match proof commitments");
            return Err(err.into());
        }

        Ok(Self {
            call: adapt(proof)?,
            identities,
            token_uri: token_uri.into(),
            period: period.into(),
        })
    }

    /// ABI-encoded `mintBadge` call, selector included.
    pub fn calldata(&self) -> Vec<u8> {
        let selector = ethers_core::utils::id(MINT_SIGNATURE);
        let [a1, a2, a3] = self.identities.as_strs();

        let tokens = [
            uint_array(&self.call.a),
            Token::FixedArray(self.call.b.iter().map(|row| uint_array(row)).collect()),
            uint_array(&self.call.c),
            uint_array(&self.call.public_signals),
            Token::String(a1.to_string()),
            Token::String(a2.to_string()),
            Token::String(a3.to_string()),
            Token::String(self.token_uri.clone()),
            Token::String(self.period.clone()),
        ];

        let mut data = selector.to_vec();
        data.extend(encode(&tokens));
        data
    }

    /// Identifier of the proof this intent carries.
    ///
    /// Proofs are randomized, so a fresh proof gives a fresh fingerprint
    /// even for the same identities.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut bytes = Vec::with_capacity(8 * 32);
        let points = self
            .call
            .a
            .iter()
            .chain(self.call.b.iter().flatten())
            .chain(self.call.c.iter());
        for value in points {
            let mut word = [0u8; 32];
            value.to_big_endian(&mut word);
            bytes.extend_from_slice(&word);
        }
        keccak256(&bytes)
    }
}

fn uint_array(values: &[U256]) -> Token {
    Token::FixedArray(values.iter().copied().map(Token::Uint).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MintError;
    use ethers_core::abi::{decode, ParamType};
    use topbadge_proof::{build_inputs_for, check_consistency};
    use topbadge_types::{Groth16Proof, ProofObject};

    fn identities() -> IdentityTriple {
        IdentityTriple::from_strs("Radiohead", "Boards of Canada", "Aphex Twin").expect("valid")
    }

    fn consistent_for(identities: &IdentityTriple) -> ConsistentProof {
        let (_, expected) = build_inputs_for(identities);
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
        check_consistency(proof, &expected).expect("consistent")
    }

    #[test]
    fn test_selector_is_keccak_prefix() {
        let digest = keccak256(MINT_SIGNATURE.as_bytes());
        assert_eq!(ethers_core::utils::id(MINT_SIGNATURE), digest[..4]);
    }

    #[test]
    fn test_calldata_decodes_to_call_arguments() {
        let intent = MintIntent::new(
            &consistent_for(&identities()),
            identities(),
            "data:application/json;base64,e30=",
            "March 2025",
        )
        .expect("intent");
        let data = intent.calldata();
        assert_eq!(data[..4], ethers_core::utils::id(MINT_SIGNATURE));

        let uint2 = ParamType::FixedArray(Box::new(ParamType::Uint(256)), 2);
        let params = [
            uint2.clone(),
            ParamType::FixedArray(Box::new(uint2.clone()), 2),
            uint2,
            ParamType::FixedArray(Box::new(ParamType::Uint(256)), 3),
            ParamType::String,
            ParamType::String,
            ParamType::String,
            ParamType::String,
            ParamType::String,
        ];
        let tokens = decode(&params, &data[4..]).expect("decode");

        // b is passed swapped: [[4, 3], [6, 5]].
        let b = Token::FixedArray(vec![
            Token::FixedArray(vec![Token::Uint(4.into()), Token::Uint(3.into())]),
            Token::FixedArray(vec![Token::Uint(6.into()), Token::Uint(5.into())]),
        ]);
        assert_eq!(tokens[1], b);
        assert_eq!(tokens[4], Token::String("Radiohead".into()));
        assert_eq!(tokens[6], Token::String("Aphex Twin".into()));
        assert_eq!(tokens[8], Token::String("March 2025".into()));
    }

    #[test]
    fn test_identities_must_match_proof() {
        let other = IdentityTriple::from_strs("Radiohead", "Aphex Twin", "Boards of Canada")
            .expect("valid");
        let err = MintIntent::new(&consistent_for(&identities()), other, "uri", "March 2025")
            .expect_err("reordered identities");
        assert!(matches!(
            err,
            MintError::Proof(ProofError::Consistency { position: 1, .. })
        ));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_fingerprint_ignores_metadata() {
        let proof = consistent_for(&identities());
        let a = MintIntent::new(&proof, identities(), "uri-a", "March 2025").expect("intent");
        let b = MintIntent::new(&proof, identities(), "uri-b", "April 2025").expect("intent");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.calldata(), b.calldata());
    }
}
