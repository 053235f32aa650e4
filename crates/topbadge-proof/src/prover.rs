//! Proving-engine collaborator.

use std::future::Future;

use topbadge_types::{CircuitInput, ProgramArtifacts, ProofObject};

/// Failure reported by a proving engine.
pub type ProverError = Box<dyn std::error::Error + Send + Sync>;

/// Produces Groth16 proofs for the commitment circuit.
///
/// Proving can take seconds; implementations must not block the async
/// runtime while they work.
pub trait Prover {
    /// Prove `input` with the given circuit program and proving key.
    fn prove(
        &self,
        input: &CircuitInput,
        artifacts: &ProgramArtifacts,
    ) -> impl Future<Output = Result<ProofObject, ProverError>> + Send;
}
