// src/zkp/proof_verification.rs
//! # Zero-Knowledge Proof Verification
//!
//! Verifies credential proofs against the artifacts of the circuit that
//! produced them. The proof carries its own public-input bundle (the signer
//! public key) and the fingerprint of the compiled circuit, so a proof can
//! only be checked by the [`CompiledCircuit`] it was made with.
//!
//! ## Security Considerations
//! - A `true` result means *some* key signed the credential; callers that
//!   care about who signed must compare [`CredentialProof::public_key`] with a
//!   trusted key (see `services::verifier`)

use std::time::Instant;

use ark_bn254::Bn254;
use ark_groth16::Groth16;
use ark_snark::SNARK;
use log::{info, warn};

use crate::error::{Result, ZkcError};
use crate::zkp::circuit::CredentialCircuit;
use crate::zkp::proof_generation::{CompiledCircuit, CredentialProof};

impl CompiledCircuit {
    /// Verifies a credential proof.
    ///
    /// # Returns
    /// - `Ok(true)` if the proof is valid for its public key
    /// - `Ok(false)` if it is not
    /// - `Err(ArtifactMismatch)` if the proof was produced by a different
    ///   compiled circuit
    pub fn verify(&self, proof: &CredentialProof) -> Result<bool> {
        self.check_artifact(proof)?;

        let verify_start = Instant::now();
        info!("Verify proof start");
        let public_inputs = CredentialCircuit::public_inputs(&proof.public_key);
        let verified =
            Groth16::<Bn254>::verify_with_processed_vk(self.prepared_vk(), &public_inputs, &proof.proof)?;
        info!(
            "Proof verified, spent = {} ms",
            verify_start.elapsed().as_millis()
        );

        Ok(verified)
    }

    /// Fails with `ArtifactMismatch` unless `proof` was made by this circuit.
    pub fn check_artifact(&self, proof: &CredentialProof) -> Result<()> {
        if proof.artifact_id != self.artifact_id() {
            warn!(
                "Proof artifact {} does not match compiled circuit {}",
                proof.artifact_id,
                self.artifact_id()
            );
            return Err(ZkcError::ArtifactMismatch {
                expected: self.artifact_id().to_string(),
                actual: proof.artifact_id.to_string(),
            });
        }
        Ok(())
    }
}
