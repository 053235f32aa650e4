//! Proving-engine input and output shapes.
//!
//! The external proving engine takes named decimal inputs and returns a
//! Groth16 proof with projective coordinates plus the public signals, all as
//! decimal strings:
//!
//! ```json
//! { "proof": { "pi_a": [x, y, "1"],
//!              "pi_b": [[x0, x1], [y0, y1], ["1", "0"]],
//!              "pi_c": [x, y, "1"],
//!              "protocol": "groth16", "curve": "bn128" },
//!   "publicSignals": ["…", "…", "…"] }
//! ```

use serde::{Deserialize, Serialize};

/// Named circuit inputs, one field element per identity, in decimal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CircuitInput {
    pub artist1_hash: String,
    pub artist2_hash: String,
    pub artist3_hash: String,
}

impl CircuitInput {
    /// Inputs in circuit order.
    pub fn as_array(&self) -> [&str; 3] {
        [&self.artist1_hash, &self.artist2_hash, &self.artist3_hash]
    }
}

/// Raw Groth16 proof in the proving engine's native coordinate layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct Groth16Proof {
    /// G1 point `[x, y, z]`.
    pub pi_a: [String; 3],
    /// G2 point `[[x.c0, x.c1], [y.c0, y.c1], [z.c0, z.c1]]`.
    pub pi_b: [[String; 2]; 3],
    /// G1 point `[x, y, z]`.
    pub pi_c: [String; 3],
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_curve")]
    pub curve: String,
}

/// A proof together with its public signals, as returned by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct ProofObject {
    pub proof: Groth16Proof,
    #[serde(rename = "publicSignals")]
    pub public_signals: Vec<String>,
}

/// References to the compiled circuit program and proving key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct ProgramArtifacts {
    /// Witness generator (`.wasm`).
    pub wasm: String,
    /// Proving key (`.zkey`).
    pub zkey: String,
}

impl Default for ProgramArtifacts {
    fn default() -> Self {
        Self {
            wasm: "/zk/top_artists.wasm".to_string(),
            zkey: "/zk/top_artists_final.zkey".to_string(),
        }
    }
}

fn default_protocol() -> String {
    "groth16".to_string()
}

fn default_curve() -> String {
    "bn128".to_string()
}
