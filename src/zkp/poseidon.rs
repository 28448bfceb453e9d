// src/zkp/poseidon.rs
//! Poseidon parameters and hashing for the BN254 scalar field.
//!
//! The same configuration is used natively (credential hashing, signature
//! challenges, public-key digests) and inside the proof circuit, so both
//! sides must always agree on these parameters.

use ark_bn254::Fr as Bn254Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_crypto_primitives::sponge::poseidon::{find_poseidon_ark_and_mds, PoseidonConfig, PoseidonSponge};
use ark_crypto_primitives::sponge::CryptographicSponge;
use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use once_cell::sync::Lazy;

/// Number of full (S-box on every lane) rounds.
pub const FULL_ROUNDS: usize = 8;
/// Number of partial (S-box on the first lane) rounds.
pub const PARTIAL_ROUNDS: usize = 57;
/// S-box exponent.
pub const ALPHA: u64 = 5;
pub const RATE: usize = 2;
pub const CAPACITY: usize = 1;

/// Cached Poseidon configuration for the BN254 scalar field
///
/// ## Parameters
/// - Full rounds: 8
/// - Partial rounds: 57
/// - Alpha (S-box): 5
/// - Rate: 2
/// - Capacity: 1
static POSEIDON_CONFIG: Lazy<PoseidonConfig<Bn254Fr>> = Lazy::new(generate_poseidon_config);

/// Generates Poseidon parameters for BN254.
///
/// Round constants and the MDS matrix come from the Grain LFSR procedure of
/// the Poseidon paper, seeded with the field size and round counts above.
pub fn generate_poseidon_config() -> PoseidonConfig<Bn254Fr> {
    let (ark, mds) = find_poseidon_ark_and_mds::<Bn254Fr>(
        Bn254Fr::MODULUS_BIT_SIZE as u64,
        RATE,
        FULL_ROUNDS as u64,
        PARTIAL_ROUNDS as u64,
        0,
    );

    PoseidonConfig {
        full_rounds: FULL_ROUNDS,
        partial_rounds: PARTIAL_ROUNDS,
        alpha: ALPHA,
        rate: RATE,
        capacity: CAPACITY,
        mds,
        ark,
    }
}

/// Retrieves the global Poseidon configuration
pub fn get_poseidon_config() -> PoseidonConfig<Bn254Fr> {
    POSEIDON_CONFIG.clone()
}

/// Hashes an ordered slice of field elements into a single element.
///
/// Absorbs every input in order and squeezes one element. Input order is
/// part of the digest: permuting the inputs changes the result.
pub fn hash(config: &PoseidonConfig<Bn254Fr>, inputs: &[Bn254Fr]) -> Bn254Fr {
    let mut sponge = PoseidonSponge::<Bn254Fr>::new(config);
    sponge.absorb(&inputs.to_vec());
    sponge.squeeze_field_elements::<Bn254Fr>(1)[0]
}

/// In-circuit counterpart of [`hash`].
pub fn hash_var(
    cs: ConstraintSystemRef<Bn254Fr>,
    config: &PoseidonConfig<Bn254Fr>,
    inputs: &[FpVar<Bn254Fr>],
) -> Result<FpVar<Bn254Fr>, SynthesisError> {
    let mut sponge_var = PoseidonSpongeVar::<Bn254Fr>::new(cs, config);
    sponge_var.absorb(&inputs.to_vec())?;
    let mut squeezed = sponge_var.squeeze_field_elements(1)?;
    Ok(squeezed.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_r1cs_std::prelude::*;
    use ark_relations::r1cs::ConstraintSystem;

    #[test]
    fn test_config_shape() {
        let config = get_poseidon_config();
        assert_eq!(config.ark.len(), FULL_ROUNDS + PARTIAL_ROUNDS);
        assert!(config.ark.iter().all(|row| row.len() == RATE + CAPACITY));
        assert_eq!(config.mds.len(), RATE + CAPACITY);
    }

    #[test]
    fn test_hash_is_order_sensitive() {
        let config = get_poseidon_config();
        let a = Bn254Fr::from(1u64);
        let b = Bn254Fr::from(2u64);

        assert_eq!(hash(&config, &[a, b]), hash(&config, &[a, b]));
        assert_ne!(hash(&config, &[a, b]), hash(&config, &[b, a]));
    }

    #[test]
    fn test_gadget_matches_native_hash() {
        let config = get_poseidon_config();
        let inputs: Vec<Bn254Fr> = (1u64..=9).map(Bn254Fr::from).collect();

        let cs = ConstraintSystem::<Bn254Fr>::new_ref();
        let vars: Vec<FpVar<Bn254Fr>> = inputs
            .iter()
            .map(|v| FpVar::new_witness(cs.clone(), || Ok(*v)).unwrap())
            .collect();
        let digest = hash_var(cs.clone(), &config, &vars).unwrap();

        assert_eq!(digest.value().unwrap(), hash(&config, &inputs));
        assert!(cs.is_satisfied().unwrap());
    }
}
