// src/zkp/circuit.rs
//! Constraint program proving possession of an issuer-signed credential.
//!
//! The circuit re-derives the credential hash from the private scalar vector,
//! checks the issuer's Schnorr signature over it and asserts the fixed policy
//! equalities, without revealing the vector or the signature.

use ark_bn254::Fr as Bn254Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_ec::AffineRepr;
use ark_ed_on_bn254::constraints::EdwardsVar;
use ark_ed_on_bn254::{EdwardsAffine, Fr as JubjubScalar};
use ark_ff::{BigInteger, PrimeField};
use ark_r1cs_std::prelude::*;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::ns;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::encoding::field_mapper::{FieldMapper, LeafValue, ScalarVector};
use crate::encoding::schema::ISSUER_TYPE_POSITION;
use crate::error::{Result, ZkcError};
use crate::utils::crypto::Signature;
use crate::wallet::key_management::PublicKey;
use crate::zkp::poseidon;

/// Number of scalar positions the circuit commits to.
pub const CREDENTIAL_ARITY: usize = 9;
/// Positions of the two policy-checked claim leaves.
pub const CLAIM_POSITIONS: [usize; 2] = [7, 8];

/// Attribute policy baked into a compiled circuit.
///
/// Each distinct policy compiles to its own proving/verifying artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitPolicy {
    /// Required `issuer.id.type`
    pub issuer_type: LeafValue,
    /// Required values of the claim leaves at [`CLAIM_POSITIONS`], in canonical order
    pub claim_leaves: [LeafValue; 2],
}

impl CircuitPolicy {
    pub fn new(issuer_type: impl Into<LeafValue>, claim_leaves: [LeafValue; 2]) -> Self {
        Self {
            issuer_type: issuer_type.into(),
            claim_leaves,
        }
    }

    /// Maps the policy literals through the same reduction as credential
    /// leaves.
    pub fn constants(&self, mapper: &FieldMapper) -> Result<PolicyConstants> {
        Ok(PolicyConstants {
            issuer_type: mapper.to_field(&self.issuer_type)?,
            claim_leaves: [
                mapper.to_field(&self.claim_leaves[0])?,
                mapper.to_field(&self.claim_leaves[1])?,
            ],
        })
    }
}

/// Field-element form of a [`CircuitPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyConstants {
    pub issuer_type: Bn254Fr,
    pub claim_leaves: [Bn254Fr; 2],
}

/// Witness assignment for one proof.
#[derive(Clone)]
pub struct CredentialWitness {
    pub signature: Signature,
    pub fields: [Bn254Fr; CREDENTIAL_ARITY],
}

impl CredentialWitness {
    pub fn new(signature: Signature, vector: &ScalarVector) -> Result<Self> {
        let fields: [Bn254Fr; CREDENTIAL_ARITY] =
            vector
                .as_slice()
                .try_into()
                .map_err(|_| ZkcError::ArityMismatch {
                    expected: CREDENTIAL_ARITY,
                    actual: vector.len(),
                })?;
        Ok(Self { signature, fields })
    }
}

/// Credential proof circuit.
///
/// # Inputs
/// - public: signer public key `(x, y)`
/// - private: signature `(R, s)` and the 9-element scalar vector
///
/// # Constraints, in order
/// 1. `vector[0] == policy.issuer_type`
/// 2. `vector[7] == policy.claim_leaves[0]`, `vector[8] == policy.claim_leaves[1]`
/// 3. `msg = Poseidon(vector)`
/// 4. `s·G == R + Poseidon(R, PK, msg)·PK`
#[derive(Clone)]
pub struct CredentialCircuit {
    pub policy: PolicyConstants,
    pub public_key: Option<EdwardsAffine>,
    pub witness: Option<CredentialWitness>,
    pub poseidon_config: PoseidonConfig<Bn254Fr>,
}

impl CredentialCircuit {
    /// Shape-only instance used for key generation.
    pub fn blank(policy: PolicyConstants, poseidon_config: PoseidonConfig<Bn254Fr>) -> Self {
        Self {
            policy,
            public_key: None,
            witness: None,
            poseidon_config,
        }
    }

    pub fn with_assignment(
        policy: PolicyConstants,
        poseidon_config: PoseidonConfig<Bn254Fr>,
        public_key: &PublicKey,
        witness: CredentialWitness,
    ) -> Self {
        Self {
            policy,
            public_key: Some(public_key.point()),
            witness: Some(witness),
            poseidon_config,
        }
    }

    /// Public inputs in allocation order.
    pub fn public_inputs(public_key: &PublicKey) -> Vec<Bn254Fr> {
        public_key.to_fields().to_vec()
    }
}

impl ConstraintSynthesizer<Bn254Fr> for CredentialCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Bn254Fr>) -> core::result::Result<(), SynthesisError> {
        let witness = self.witness.as_ref();

        // Signer key as public input
        let pk_x = FpVar::new_input(ns!(cs, "pk_x"), || {
            self.public_key.map(|pk| pk.x).ok_or(SynthesisError::AssignmentMissing)
        })?;
        let pk_y = FpVar::new_input(ns!(cs, "pk_y"), || {
            self.public_key.map(|pk| pk.y).ok_or(SynthesisError::AssignmentMissing)
        })?;
        let public_key = EdwardsVar::new(pk_x.clone(), pk_y.clone());

        let fields = (0..CREDENTIAL_ARITY)
            .map(|i| {
                FpVar::new_witness(ns!(cs, "credential_field"), || {
                    witness.map(|w| w.fields[i]).ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<core::result::Result<Vec<_>, _>>()?;

        let r = EdwardsVar::new_witness(ns!(cs, "signature_r"), || {
            witness.map(|w| w.signature.r).ok_or(SynthesisError::AssignmentMissing)
        })?;
        let s_bits = (0..JubjubScalar::MODULUS_BIT_SIZE as usize)
            .map(|i| {
                Boolean::new_witness(ns!(cs, "signature_s_bit"), || {
                    witness
                        .map(|w| w.signature.s.into_bigint().get_bit(i))
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<core::result::Result<Vec<_>, _>>()?;

        // 1. Issuer role
        fields[ISSUER_TYPE_POSITION].enforce_equal(&FpVar::constant(self.policy.issuer_type))?;

        // 2. Fixed claim leaves
        for (position, expected) in CLAIM_POSITIONS.iter().zip(self.policy.claim_leaves.iter()) {
            fields[*position].enforce_equal(&FpVar::constant(*expected))?;
        }

        // 3. Credential hash
        let msg = poseidon::hash_var(cs.clone(), &self.poseidon_config, &fields)?;

        // 4. Schnorr verification
        let e = poseidon::hash_var(
            cs.clone(),
            &self.poseidon_config,
            &[r.x.clone(), r.y.clone(), pk_x, pk_y, msg],
        )?;
        let e_bits = e.to_bits_le()?;

        let generator = EdwardsVar::constant(EdwardsAffine::generator().into_group());
        let lhs = generator.scalar_mul_le(s_bits.iter())?;
        let rhs = r + public_key.scalar_mul_le(e_bits.iter())?;
        lhs.enforce_equal(&rhs)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto::SignatureBinder;
    use crate::wallet::key_management::KeyManager;
    use crate::zkp::poseidon::get_poseidon_config;
    use ark_relations::r1cs::ConstraintSystem;

    fn policy() -> PolicyConstants {
        CircuitPolicy::new(1u64, [LeafValue::from("twitter"), LeafValue::from("pvldshvv")])
            .constants(&FieldMapper::default())
            .unwrap()
    }

    fn vector(issuer_type: u64, username: &str) -> ScalarVector {
        let mapper = FieldMapper::default();
        let mut fields: Vec<Bn254Fr> = (0u64..7).map(Bn254Fr::from).collect();
        fields[0] = Bn254Fr::from(issuer_type);
        fields.push(mapper.to_field(&LeafValue::from("twitter")).unwrap());
        fields.push(mapper.to_field(&LeafValue::from(username)).unwrap());
        ScalarVector::new(fields)
    }

    fn is_satisfied(issuer_type: u64, username: &str, sign_with_issuer: bool) -> bool {
        let binder = SignatureBinder::default();
        let issuer = KeyManager::new();
        let other = KeyManager::new();

        let vector = vector(issuer_type, username);
        let signer = if sign_with_issuer { &issuer } else { &other };
        let signature = binder.sign(signer.secret_key(), binder.hash(&vector));

        let circuit = CredentialCircuit::with_assignment(
            policy(),
            get_poseidon_config(),
            &issuer.public_key,
            CredentialWitness::new(signature, &vector).unwrap(),
        );
        let cs = ConstraintSystem::<Bn254Fr>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        cs.is_satisfied().unwrap()
    }

    #[test]
    fn test_accepts_valid_assignment() {
        assert!(is_satisfied(1, "pvldshvv", true));
    }

    #[test]
    fn test_rejects_wrong_issuer_type() {
        assert!(!is_satisfied(2, "pvldshvv", true));
    }

    #[test]
    fn test_rejects_wrong_claim_leaf() {
        assert!(!is_satisfied(1, "someone-else", true));
    }

    #[test]
    fn test_rejects_foreign_signature() {
        assert!(!is_satisfied(1, "pvldshvv", false));
    }

    #[test]
    fn test_witness_arity() {
        let signature = SignatureBinder::default().sign(KeyManager::new().secret_key(), Bn254Fr::from(1u64));
        let short = ScalarVector::new(vec![Bn254Fr::from(1u64); 8]);
        assert!(matches!(
            CredentialWitness::new(signature, &short),
            Err(ZkcError::ArityMismatch { expected: 9, actual: 8 })
        ));
    }
}
