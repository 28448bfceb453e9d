// src/zkp/proof_generation.rs
//! Circuit compilation and proof generation.
//!
//! This module turns a [`CircuitPolicy`] into reusable Groth16 artifacts over
//! BN254 and produces credential proofs against them. Compilation is the
//! expensive one-time step; the resulting [`CompiledCircuit`] is immutable
//! and may be shared by reference across any number of prove/verify calls.

use std::fmt;
use std::time::Instant;

use ark_bn254::{Bn254, Fr as Bn254Fr};
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, ProvingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_serialize::CanonicalSerialize;
use ark_snark::{CircuitSpecificSetupSNARK, SNARK};
use log::{debug, info, warn};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::encoding::field_mapper::{FieldMapper, ScalarVector};
use crate::error::{Result, ZkcError};
use crate::utils::crypto::Signature;
use crate::wallet::key_management::PublicKey;
use crate::zkp::circuit::{CircuitPolicy, CredentialCircuit, CredentialWitness, PolicyConstants};
use crate::zkp::poseidon::get_poseidon_config;

/// Fingerprint of a compiled circuit: SHA-256 of its verifying key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactId(pub [u8; 32]);

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArtifactId({})", self)
    }
}

/// A credential proof together with its public-input bundle.
#[derive(Clone, Debug, PartialEq)]
pub struct CredentialProof {
    /// Circuit the proof was produced against
    pub artifact_id: ArtifactId,
    /// Signer public key (the public input)
    pub public_key: PublicKey,
    pub proof: Proof<Bn254>,
}

/// Proving and verifying artifacts for one policy.
pub struct CompiledCircuit {
    policy: CircuitPolicy,
    constants: PolicyConstants,
    poseidon_config: PoseidonConfig<Bn254Fr>,
    proving_key: ProvingKey<Bn254>,
    prepared_vk: PreparedVerifyingKey<Bn254>,
    artifact_id: ArtifactId,
}

impl CompiledCircuit {
    /// Compiles the circuit for `policy` with randomness from the OS RNG.
    ///
    /// Policy literals are reduced with `mapper`, which must use the same text
    /// encoding as the mapper that encodes credentials.
    pub fn compile(policy: CircuitPolicy, mapper: &FieldMapper) -> Result<Self> {
        Self::compile_with_rng(policy, mapper, &mut OsRng)
    }

    pub fn compile_with_rng<R: RngCore + CryptoRng>(
        policy: CircuitPolicy,
        mapper: &FieldMapper,
        rng: &mut R,
    ) -> Result<Self> {
        let constants = policy.constants(mapper)?;
        let poseidon_config = get_poseidon_config();

        let compile_start = Instant::now();
        info!("Compilation start");
        let circuit = CredentialCircuit::blank(constants, poseidon_config.clone());
        let (proving_key, verifying_key) = Groth16::<Bn254>::setup(circuit, rng)?;
        let prepared_vk = Groth16::<Bn254>::process_vk(&verifying_key)?;
        info!(
            "Compilation finished, spent = {} ms",
            compile_start.elapsed().as_millis()
        );

        let mut vk_bytes = Vec::new();
        verifying_key.serialize_compressed(&mut vk_bytes)?;
        let artifact_id = ArtifactId(Sha256::digest(&vk_bytes).into());
        debug!("Compiled circuit artifact {}", artifact_id);

        Ok(Self {
            policy,
            constants,
            poseidon_config,
            proving_key,
            prepared_vk,
            artifact_id,
        })
    }

    pub fn policy(&self) -> &CircuitPolicy {
        &self.policy
    }

    pub fn artifact_id(&self) -> ArtifactId {
        self.artifact_id
    }


    pub(crate) fn prepared_vk(&self) -> &PreparedVerifyingKey<Bn254> {
        &self.prepared_vk
    }

    /// Proves knowledge of `signature` by `public_key` over `vector`.
    ///
    /// # Errors
    /// - `ArityMismatch` if the vector does not have 9 elements
    /// - `Unsatisfied` if any policy check or the signature check fails; no
    ///   proof is produced in that case
    pub fn prove(
        &self,
        public_key: &PublicKey,
        signature: &Signature,
        vector: &ScalarVector,
    ) -> Result<CredentialProof> {
        self.prove_with_rng(public_key, signature, vector, &mut OsRng)
    }

    pub fn prove_with_rng<R: RngCore + CryptoRng>(
        &self,
        public_key: &PublicKey,
        signature: &Signature,
        vector: &ScalarVector,
        rng: &mut R,
    ) -> Result<CredentialProof> {
        let witness = CredentialWitness::new(*signature, vector)?;
        let circuit = CredentialCircuit::with_assignment(
            self.constants,
            self.poseidon_config.clone(),
            public_key,
            witness,
        );

        // Groth16 does not check satisfaction itself.
        let cs = ConstraintSystem::<Bn254Fr>::new_ref();
        circuit.clone().generate_constraints(cs.clone())?;
        if !cs.is_satisfied()? {
            let which = cs
                .which_is_unsatisfied()?
                .unwrap_or_else(|| "unknown constraint".to_string());
            warn!("Refusing to prove: credential does not satisfy circuit ({})", which);
            return Err(ZkcError::Unsatisfied(which));
        }
        debug!("Constraint system satisfied with {} constraints", cs.num_constraints());

        let proof_start = Instant::now();
        info!("Create proof start");
        let proof = Groth16::<Bn254>::prove(&self.proving_key, circuit, rng)?;
        info!(
            "Proof created, spent = {} ms",
            proof_start.elapsed().as_millis()
        );

        Ok(CredentialProof {
            artifact_id: self.artifact_id,
            public_key: *public_key,
            proof,
        })
    }
}
