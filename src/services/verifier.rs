// src/services/verifier.rs
//! Credential verification service.
//!
//! Accepts a proof only if it verifies against the compiled circuit *and*
//! was produced for the trusted issuer key.

use std::sync::Arc;

use log::warn;

use crate::error::Result;
use crate::utils::serialization::deserialize_proof;
use crate::wallet::key_management::PublicKey;
use crate::zkp::proof_generation::{CompiledCircuit, CredentialProof};

/// Verifier bound to one compiled circuit and one trusted issuer.
///
/// The compiled circuit is shared read-only through an `Arc`.
#[derive(Clone)]
pub struct Verifier {
    circuit: Arc<CompiledCircuit>,
    trusted_issuer: PublicKey,
}

impl Verifier {
    pub fn new(circuit: Arc<CompiledCircuit>, trusted_issuer: PublicKey) -> Self {
        Self {
            circuit,
            trusted_issuer,
        }
    }

    /// Verifies a proof.
    ///
    /// # Returns
    /// - `Ok(true)` if the proof is valid and signed by the trusted issuer
    /// - `Ok(false)` if it is invalid or signed by any other key
    /// - `Err(ArtifactMismatch)` if the proof belongs to a different compiled
    ///   circuit, whoever signed it
    pub fn verify(&self, proof: &CredentialProof) -> Result<bool> {
        self.circuit.check_artifact(proof)?;
        if proof.public_key != self.trusted_issuer {
            warn!("Proof was made for an untrusted issuer key");
            return Ok(false);
        }
        self.circuit.verify(proof)
    }

    /// Verifies a base64-encoded proof.
    pub fn verify_encoded(&self, encoded: &str) -> Result<bool> {
        self.verify(&deserialize_proof(encoded)?)
    }
}
