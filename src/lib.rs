// src/lib.rs

//! # zk-credential
//!
//! Zero-knowledge proofs that an identity credential was signed by a claimed
//! issuer and satisfies a fixed attribute policy, without revealing the
//! credential values or the signature.
//!
//! ## Pipeline
//! 1. **Canonical encoding**: credential → sorted `(path, value)` leaves
//! 2. **Field mapping**: leaves → BN254 scalar vector
//! 3. **Signature binding**: Poseidon hash of the vector, Schnorr-signed on Baby Jubjub
//! 4. **Proof circuit**: Groth16 proof of policy + hash + signature
//!
//! ```no_run
//! use zk_credential::prelude::*;
//!
//! # fn run(signed: SignedCredential) -> zk_credential::error::Result<()> {
//! let policy = CircuitPolicy::new(1u64, [LeafValue::from("twitter"), LeafValue::from("pvldshvv")]);
//! let circuit = CompiledCircuit::compile(policy, &FieldMapper::default())?;
//! let proof = generate_credential_proof(&circuit, &signed)?;
//! assert!(circuit.verify(&proof)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod wallet;
pub mod zkp;

pub mod prelude {
    pub use crate::encoding::canonical::{canonicalize, flatten, sort, to_values, CanonicalForm};
    pub use crate::encoding::field_mapper::{FieldMapper, LeafValue, ScalarVector, TextEncoding};
    pub use crate::encoding::schema::{CredentialSchema, FieldKind, SchemaField};
    pub use crate::error::ZkcError;
    pub use crate::models::credential::{Credential, Identifier, Party, Subject};
    pub use crate::services::credential_issuer::{CredentialIssuer, SignedCredential};
    pub use crate::services::verifier::Verifier;
    pub use crate::utils::crypto::{Signature, SignatureBinder};
    pub use crate::wallet::key_management::{KeyManager, PublicKey};
    pub use crate::wallet::zkp_generation::generate_credential_proof;
    pub use crate::zkp::circuit::CircuitPolicy;
    pub use crate::zkp::proof_generation::{CompiledCircuit, CredentialProof};
}
