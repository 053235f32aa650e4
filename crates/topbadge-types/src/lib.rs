//! # topbadge-types
//!
//! Wire types shared by the attestation backend, the proving client and the
//! mint flow. Field names follow the proving engine and circuit exactly,
//! since these structures are exchanged with JavaScript tooling.

pub mod chain;
pub mod identity;
pub mod proof;

pub use chain::ChainId;
pub use identity::{IdentityError, IdentityTriple, RankedItem};
pub use proof::{CircuitInput, Groth16Proof, ProgramArtifacts, ProofObject};

/// Transaction hash.
pub type TxHash = [u8; 32];

/// Number of ranked identities bound by one attestation.
pub const IDENTITY_COUNT: usize = 3;

/// Number of public signals the circuit exposes, one per identity.
pub const PUBLIC_SIGNAL_COUNT: usize = IDENTITY_COUNT;
