// src/wallet/zkp_generation.rs
//! Zero-Knowledge Proof (ZKP) generation for issued credentials.
//!
//! The holder proves that the issuer signed its credential and that the
//! credential satisfies the circuit policy, without revealing the
//! credential's values or the signature.

use crate::error::Result;
use crate::services::credential_issuer::SignedCredential;
use crate::zkp::proof_generation::{CompiledCircuit, CredentialProof};

/// Generates a zero-knowledge proof for a signed credential.
///
/// # Arguments
/// * `circuit` - Compiled circuit whose policy the credential must satisfy
/// * `signed` - Credential bundle returned by the issuer
///
/// # Errors
/// Returns `Unsatisfied` if the credential fails the policy or the signature
/// check, and `ArityMismatch` if its encoding does not have 9 positions.
pub fn generate_credential_proof(
    circuit: &CompiledCircuit,
    signed: &SignedCredential,
) -> Result<CredentialProof> {
    circuit.prove(&signed.issuer_public_key, &signed.signature, &signed.fields)
}
