//! Attestation record.
//!
//! A record is created once per successful login and never mutated. A later
//! login produces a new record that replaces it wholesale.

use serde::{Deserialize, Serialize};
use topbadge_crypto::keccak::abi_encoded_keccak256;
use topbadge_crypto::secp256k1::{self, Address, RecoverableSignature};
use topbadge_types::{IdentityTriple, IDENTITY_COUNT};

use crate::{AttestError, Result};

/// A server-signed claim binding a session to three ordered identities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    /// The three identities in rank order.
    pub identities: IdentityTriple,
    /// Display image per identity, same order.
    pub images: [Option<String>; IDENTITY_COUNT],
    /// Personal-message signature over [`attestation_digest`].
    pub signature: RecoverableSignature,
    /// Unix timestamp of issuance.
    pub created_at: u64,
}

/// `keccak256(abi.encode(id1, id2, id3))`.
///
/// Positional and length-delimited: any reordering of the identities
/// changes the digest, including ones whose concatenations coincide. This is the
/// value the backend signs; it is unrelated to the per-identity field
/// commitments used as proof inputs.
pub fn attestation_digest(identities: &IdentityTriple) -> [u8; 32] {
    abi_encoded_keccak256(&identities.as_strs())
}

impl AttestationRecord {
    /// The digest this record's signature must cover.
    pub fn digest(&self) -> [u8; 32] {
        attestation_digest(&self.identities)
    }

    /// Recover the address that signed this record.
    pub fn signer(&self) -> Result<Address> {
        Ok(secp256k1::recover_message(&self.digest(), &self.signature)?)
    }

    /// Check that `expected` signed exactly these identities.
    pub fn verify(&self, expected: &Address) -> Result<()> {
        secp256k1::verify_message(&self.digest(), &self.signature, expected)
            .map_err(|_| AttestError::InvalidSignature)
    }
}
