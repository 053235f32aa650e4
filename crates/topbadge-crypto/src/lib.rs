//! # topbadge-crypto
//!
//! Cryptographic primitives for the Top Listener Badge pipeline.
//!
//! The suite is fixed by the on-chain side: keccak-256 hashing, secp256k1
//! recoverable signatures in the Ethereum personal-message format, and
//! Groth16 over BN254 whose scalar field doubles as the commitment field.
//!
//! ## Modules
//!
//! - [`keccak`]: keccak-256, Solidity ABI string encoding, EIP-191 message hashing
//! - [`field`]: string to BN254 scalar reduction used for proof commitments
//! - [`secp256k1`]: backend signing key, addresses, recoverable signatures
//! - [`groth16`]: Groth16/BN254 setup, proving and verification

pub mod field;
pub mod groth16;
pub mod keccak;
pub mod secp256k1;

/// Error types for cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Signature recovery or verification failed.
    #[error("signature verification failed")]
    SignatureVerification,

    /// Signing failed inside the ECDSA backend.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The secret key bytes are not a valid secp256k1 scalar.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// Invalid key or signature length.
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A decimal field element is malformed.
    #[error("malformed field element: {0:?}")]
    MalformedFieldElement(String),

    /// A decimal value is not strictly below the field modulus.
    #[error("value {value} is not below the field modulus")]
    FieldOverflow { value: String },

    /// Groth16 proof generation or verification failed.
    #[error("proof error: {0}")]
    Proof(String),

    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;

/// Decode a hex string with an optional `0x` prefix.
pub fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| CryptoError::InvalidInput(e.to_string()))
}

/// Encode bytes as a lowercase `0x`-prefixed hex string.
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
