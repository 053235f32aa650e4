//! Wallet and chain collaborators.
//!
//! Both traits describe external capabilities (a browser wallet, an RPC
//! node) so the orchestrator can be driven by deterministic fakes in tests.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use topbadge_crypto::secp256k1::Address;
use topbadge_types::{ChainId, TxHash};

/// Failure reported by a wallet or chain collaborator.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Hash of a submitted transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHandle(pub TxHash);

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHandle({self})")
    }
}

/// A contract call ready for signing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    pub chain_id: ChainId,
    pub to: Address,
    pub data: Vec<u8>,
}

/// Inclusion details of a finalized transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx: TxHandle,
    pub block_number: u64,
}

/// Outcome of waiting for a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Finality {
    Confirmed(Receipt),
    Reverted { reason: String },
}

/// Answer to a network switch request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
    Switched,
    Rejected,
}

/// The user's wallet.
pub trait Wallet {
    /// The chain the wallet is currently connected to.
    fn get_network(&self) -> impl Future<Output = Result<ChainId, CollaboratorError>> + Send;

    /// Ask the user to switch to `chain`.
    fn request_network_switch(
        &self,
        chain: ChainId,
    ) -> impl Future<Output = Result<SwitchOutcome, CollaboratorError>> + Send;
}

/// Transaction submission and finality tracking.
pub trait ChainSubmitter {
    /// Sign and broadcast a transaction.
    fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> impl Future<Output = Result<TxHandle, CollaboratorError>> + Send;

    /// Wait until the transaction is final or reverted.
    fn await_finality(
        &self,
        tx: &TxHandle,
    ) -> impl Future<Output = Result<Finality, CollaboratorError>> + Send;
}
