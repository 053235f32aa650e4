//! keccak-256 hashing as used by the EVM.
//!
//! Three shapes are needed by the pipeline:
//! - [`keccak256`]: plain hashing, used for commitments and addresses
//! - [`abi_encode_strings`]: Solidity `abi.encode(string, ...)`, offsets
//!   and lengths included, so string boundaries are part of the encoding
//! - [`eth_message_hash`]: EIP-191 personal-message hashing, which is what a
//!   wallet's `signMessage` actually signs

use ethers_core::abi::{encode, Token};
use sha3::{Digest, Keccak256};

/// EIP-191 version `0x45` prefix.
pub const ETH_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Compute keccak-256 of the input data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute keccak-256 over several byte strings fed in order.
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Solidity `abi.encode` of a list of `string` values.
///
/// Every string is length-prefixed and padded to a 32-byte word, so two
/// lists encode equally only if they hold the same strings in the same order.
pub fn abi_encode_strings(values: &[&str]) -> Vec<u8> {
    let tokens: Vec<Token> = values.iter().map(|v| Token::String(v.to_string())).collect();
    encode(&tokens)
}

/// `keccak256(abi.encode(values...))` over `string` values.
pub fn abi_encoded_keccak256(values: &[&str]) -> [u8; 32] {
    keccak256(&abi_encode_strings(values))
}

/// EIP-191 hash of a personal message.
///
/// `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`
/// where the length is rendered in decimal ASCII.
pub fn eth_message_hash(message: &[u8]) -> [u8; 32] {
    let len = message.len().to_string();
    keccak256_concat(&[ETH_MESSAGE_PREFIX.as_bytes(), len.as_bytes(), message])
}
