//! # topbadge-mint
//!
//! Turns a consistent, adapted proof into a minted badge.
//!
//! A [`MintIntent`] carries everything the token contract needs: the proof
//! in call layout, the three identities in clear, the token URI and the
//! period label. The [`MintOrchestrator`] drives one intent through the
//! network check, submission and finality, refusing to submit unless the
//! wallet is on the expected chain.
//!
//! ## Modules
//!
//! - [`intent`]: mint intent and `mintBadge` calldata
//! - [`metadata`]: badge metadata, token URI and period label
//! - [`wallet`]: wallet and chain collaborator traits
//! - [`orchestrator`]: the mint state machine

pub mod intent;
pub mod metadata;
pub mod orchestrator;
pub mod wallet;

pub use intent::MintIntent;
pub use metadata::{explorer_tx_url, period_label, BadgeMetadata};
pub use orchestrator::{MintConfig, MintOrchestrator, MintState};
pub use wallet::{
    ChainSubmitter, CollaboratorError, Finality, Receipt, SwitchOutcome, TransactionRequest,
    TxHandle, Wallet,
};

use topbadge_types::ChainId;

/// Error types for mint operations.
#[derive(Debug, thiserror::Error)]
pub enum MintError {
    /// The wallet is on the wrong chain and did not switch.
    #[error("wallet is on chain {actual}, expected {expected}")]
    NetworkMismatch {
        /// The chain the badge contract lives on.
        expected: ChainId,
        /// The chain the wallet reported.
        actual: ChainId,
    },

    /// The wallet could not be queried.
    #[error("wallet error: {0}")]
    Wallet(String),

    /// Submission failed or the transaction reverted.
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// Operation not valid in the current state.
    #[error("invalid mint state: expected {expected}, got {actual}")]
    InvalidState {
        /// The expected state.
        expected: &'static str,
        /// The actual state.
        actual: &'static str,
    },

    /// This proof has already produced a confirmed mint.
    #[error("proof already used for a confirmed mint")]
    AlreadyMinted,

    /// The proof could not be turned into a call.
    #[error(transparent)]
    Proof(#[from] topbadge_proof::ProofError),

    /// Metadata could not be encoded.
    #[error("metadata encoding failed: {0}")]
    Metadata(String),
}

impl MintError {
    /// Whether the user can retry this attempt.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MintError::NetworkMismatch { .. }
            | MintError::Wallet(_)
            | MintError::Transaction(_) => true,
            MintError::Proof(e) => e.is_recoverable(),
            MintError::InvalidState { .. } | MintError::AlreadyMinted | MintError::Metadata(_) => {
                false
            }
        }
    }
}

/// Convenience result type for mint operations.
pub type Result<T> = std::result::Result<T, MintError>;
