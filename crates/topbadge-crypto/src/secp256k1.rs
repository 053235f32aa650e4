//! secp256k1 recoverable signatures in the Ethereum format.
//!
//! The attestation backend signs with a secp256k1 key so the badge contract
//! can `ecrecover` the signer. Signatures are 65 bytes `r || s || v` with
//! `v` in `{27, 28}`; nonces are RFC 6979 deterministic, so the same key and
//! message always give the same signature.
//!
//! This module wraps `k256` with pipeline-specific types.

use std::fmt;
use std::str::FromStr;

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

use crate::keccak::{eth_message_hash, keccak256};
use crate::{decode_hex, encode_hex, CryptoError, Result};

/// Length of a recoverable signature in bytes.
pub const SIGNATURE_LEN: usize = 65;

/// A 20-byte Ethereum account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

/// A 65-byte recoverable ECDSA signature (`r || s || v`).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature([u8; SIGNATURE_LEN]);

/// A secp256k1 signing key held by the attestation backend.
///
/// The inner `k256` key zeroizes itself on drop.
#[derive(Clone)]
pub struct SigningKey {
    inner: k256::ecdsa::SigningKey,
}

impl SigningKey {
    /// Generate a new random signing key.
    pub fn generate() -> Self {
        Self {
            inner: k256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Create a signing key from a 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let inner = k256::ecdsa::SigningKey::from_slice(bytes)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Create a signing key from hex, with or without a `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self> {
        let bytes = Zeroizing::new(decode_hex(input)?);
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let inner = k256::ecdsa::SigningKey::from_slice(&bytes)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// The address controlled by this key.
    pub fn address(&self) -> Address {
        address_of(self.inner.verifying_key())
    }

    /// Sign a 32-byte prehashed digest.
    pub fn sign_prehash(&self, digest: &[u8; 32]) -> Result<RecoverableSignature> {
        let (signature, recovery_id) = self
            .inner
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;

        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = 27 + recovery_id.to_byte();
        Ok(RecoverableSignature(bytes))
    }

    /// Sign a personal message (EIP-191), as a wallet's `signMessage` does.
    pub fn sign_message(&self, message: &[u8]) -> Result<RecoverableSignature> {
        self.sign_prehash(&eth_message_hash(message))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("address", &self.address())
            .finish()
    }
}

/// Recover the signer address of a prehashed digest.
pub fn recover_prehash(digest: &[u8; 32], signature: &RecoverableSignature) -> Result<Address> {
    let bytes = signature.as_bytes();
    let v = bytes[64];
    let recovery_byte = match v {
        27 | 28 => v - 27,
        0 | 1 => v,
        _ => return Err(CryptoError::SignatureVerification),
    };
    let recovery_id =
        RecoveryId::from_byte(recovery_byte).ok_or(CryptoError::SignatureVerification)?;
    let ecdsa = EcdsaSignature::from_slice(&bytes[..64])
        .map_err(|_| CryptoError::SignatureVerification)?;
    let key = VerifyingKey::recover_from_prehash(digest, &ecdsa, recovery_id)
        .map_err(|_| CryptoError::SignatureVerification)?;
    Ok(address_of(&key))
}

/// Recover the signer address of a personal message (EIP-191).
pub fn recover_message(message: &[u8], signature: &RecoverableSignature) -> Result<Address> {
    recover_prehash(&eth_message_hash(message), signature)
}

/// Verify that `signature` over `message` was produced by `expected`.
pub fn verify_message(
    message: &[u8],
    signature: &RecoverableSignature,
    expected: &Address,
) -> Result<()> {
    let recovered = recover_message(message, signature)?;
    if &recovered != expected {
        return Err(CryptoError::SignatureVerification);
    }
    Ok(())
}

/// `address = keccak256(uncompressed_pubkey[1..])[12..]`
fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    Address(out)
}

impl Address {
    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_hex(&self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = decode_hex(s)?;
        let array: [u8; 20] = bytes.as_slice().try_into().map_err(|_| CryptoError::InvalidLength {
            expected: 20,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl RecoverableSignature {
    /// Wrap raw signature bytes.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// The recovery byte `v`.
    pub fn v(&self) -> u8 {
        self.0[64]
    }
}

impl fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_hex(&self.0))
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoverableSignature({self})")
    }
}

impl FromStr for RecoverableSignature {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = decode_hex(s)?;
        let array: [u8; SIGNATURE_LEN] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidLength {
                    expected: SIGNATURE_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }
}

impl Serialize for RecoverableSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecoverableSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
