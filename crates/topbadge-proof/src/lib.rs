//! # topbadge-proof
//!
//! Everything between an attestation record and an on-chain call.
//!
//! The flow is:
//! 1. [`request::build_inputs`] derives the three commitments from the record
//!    and packages them as circuit inputs.
//! 2. A [`prover::Prover`] produces a proof object (the external engine in
//!    production, [`local::LocalProver`] in development and tests).
//! 3. [`request::check_consistency`] compares the returned public signals
//!    with the commitments, in order. Only a [`request::ConsistentProof`]
//!    can continue.
//! 4. [`adapter::adapt`] reshapes the consistent proof into verifier call
//!    layout.
//!
//! ## Modules
//!
//! - [`request`]: proof request builder and consistency gate
//! - [`prover`]: proving-engine collaborator trait
//! - [`adapter`]: proof to call-format adapter
//! - [`local`]: arkworks prover for the commitment circuit

pub mod adapter;
pub mod local;
pub mod prover;
pub mod request;

pub use adapter::{adapt, CallFormat};
pub use prover::Prover;
pub use local::{CommitmentCircuit, LocalProver};
pub use request::{
    build_inputs, build_inputs_for, check_consistency, request_proof, ConsistentProof,
    ExpectedCommitments,
};

/// Error types for proof handling.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    /// The proving engine failed (bad inputs, missing artifacts, crash).
    #[error("proof generation failed: {0}")]
    Generation(String),

    /// A public signal differs from the attested commitment at `position`.
    #[error("public signal {position} is {actual}, attested commitment is {expected}")]
    Consistency {
        position: usize,
        expected: String,
        actual: String,
    },

    /// The proof carries the wrong number of public signals.
    #[error("expected {expected} public signals, proof has {actual}")]
    SignalCount { expected: usize, actual: usize },

    /// A public signal or coordinate is not a canonical field element.
    #[error("invalid field element: {0}")]
    InvalidElement(#[from] topbadge_crypto::CryptoError),

    /// The proof object does not have the expected shape.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
}

impl ProofError {
    /// Whether the proof disagrees with the attested commitments.
    ///
    /// These failures are never downgraded: the proof must be discarded.
    pub fn is_consistency_failure(&self) -> bool {
        matches!(
            self,
            ProofError::Consistency { .. } | ProofError::SignalCount { .. }
        )
    }

    /// Whether retrying the proof step can help.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProofError::Generation(_))
    }
}

/// Convenience result type for proof operations.
pub type Result<T> = std::result::Result<T, ProofError>;
