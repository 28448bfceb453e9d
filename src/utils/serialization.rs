// src/utils/serialization.rs
//! Serialization utilities.
//!
//! Provides serialization and deserialization functions for:
//! - Credential documents (JSON)
//! - Credential proofs (base64 of the compressed arkworks encoding)

use ark_bn254::Bn254;
use ark_groth16::Proof;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ZkcError};
use crate::wallet::key_management::PublicKey;
use crate::zkp::proof_generation::{ArtifactId, CredentialProof};

/// Length of the compressed Baby Jubjub point encoding.
const PUBLIC_KEY_LEN: usize = 32;

/// Serializes a value to a JSON string.
pub fn serialize<T: Serialize>(data: &T) -> Result<String> {
    Ok(serde_json::to_string(data)?)
}

/// Deserializes a value from a JSON string.
pub fn deserialize<'a, T: Deserialize<'a>>(data: &'a str) -> Result<T> {
    Ok(serde_json::from_str(data)?)
}

/// Encodes a proof as base64 of `artifact id ‖ public key ‖ groth16 proof`.
pub fn serialize_proof(proof: &CredentialProof) -> Result<String> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&proof.artifact_id.0);
    bytes.extend_from_slice(&proof.public_key.to_bytes()?);
    proof.proof.serialize_compressed(&mut bytes)?;
    Ok(base64::encode(bytes))
}

/// Decodes a proof produced by [`serialize_proof`].
pub fn deserialize_proof(data: &str) -> Result<CredentialProof> {
    let bytes = base64::decode(data)?;
    if bytes.len() < 32 + PUBLIC_KEY_LEN {
        return Err(ZkcError::Serialization(format!(
            "proof encoding too short: {} bytes",
            bytes.len()
        )));
    }

    let (id_bytes, rest) = bytes.split_at(32);
    let (key_bytes, proof_bytes) = rest.split_at(PUBLIC_KEY_LEN);

    let mut artifact_id = [0u8; 32];
    artifact_id.copy_from_slice(id_bytes);
    let public_key = PublicKey::from_bytes(key_bytes)?;
    let mut reader = proof_bytes;
    let proof = Proof::<Bn254>::deserialize_compressed(&mut reader)?;
    if !reader.is_empty() {
        return Err(ZkcError::Serialization(format!(
            "{} trailing bytes after proof",
            reader.len()
        )));
    }

    Ok(CredentialProof {
        artifact_id: ArtifactId(artifact_id),
        public_key,
        proof,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_truncated_proof() {
        let encoded = base64::encode([0u8; 16]);
        assert!(matches!(
            deserialize_proof(&encoded),
            Err(ZkcError::Serialization(_))
        ));
    }
}
