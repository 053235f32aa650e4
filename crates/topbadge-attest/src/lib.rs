//! # topbadge-attest
//!
//! Server-side attestation of a user's top three identities.
//!
//! After the OAuth collaborator yields an access token, the backend fetches
//! the ranked items, signs the ordered triple with its secp256k1 key and
//! stores the resulting record against the caller's session. The client later
//! reads the record back to build its proof request.
//!
//! ## Modules
//!
//! - [`record`]: the immutable attestation record
//! - [`signer`]: the backend signer holding the private key
//! - [`session`]: per-session record storage
//! - [`provider`]: identity-provider collaborator and the login flow

pub mod provider;
pub mod record;
pub mod session;
pub mod signer;

pub use record::AttestationRecord;
pub use session::{MemorySessionStore, SessionId, SessionStore};
pub use signer::AttestationSigner;

/// Error types for attestation operations.
#[derive(Debug, thiserror::Error)]
pub enum AttestError {
    /// The identity provider returned too little or unusable data.
    #[error("upstream data error: {0}")]
    UpstreamData(String),

    /// The identity provider call itself failed.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// No attestation exists for the session (not logged in).
    #[error("no attestation for session {0}")]
    NotFound(SessionId),

    /// A record's signature does not match its identities.
    #[error("attestation signature does not match its identities")]
    InvalidSignature,

    /// Underlying cryptographic failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] topbadge_crypto::CryptoError),
}

impl AttestError {
    /// Whether the user can recover by retrying login.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AttestError::Crypto(_))
    }
}

/// Convenience result type for attestation operations.
pub type Result<T> = std::result::Result<T, AttestError>;
