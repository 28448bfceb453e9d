// src/utils/crypto.rs
//! Signature binding of a credential's scalar vector.
//!
//! The ordered vector is committed to with Poseidon and the digest is signed
//! by the issuer with a Schnorr signature over Baby Jubjub:
//!
//! - `R = k·G` for a fresh nonce `k`
//! - `e = Poseidon(R.x, R.y, PK.x, PK.y, msg)`
//! - `s = k + e·sk`
//!
//! A signature verifies iff `s·G == R + e·PK`. The challenge is computed in
//! the BN254 scalar field and applied to points by its canonical integer
//! value, which keeps the in-circuit check identical to [`SignatureBinder::verify`].

use ark_bn254::Fr as Bn254Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ed_on_bn254::{EdwardsAffine, Fr as JubjubScalar};
use ark_ff::{BigInteger, PrimeField};
use ark_std::UniformRand;
use rand::rngs::OsRng;
use rand::{CryptoRng, Rng};

use crate::encoding::field_mapper::ScalarVector;
use crate::wallet::key_management::{PublicKey, SecretKey};
use crate::zkp::poseidon::{self, get_poseidon_config};

/// Schnorr signature `(R, s)` over a single field element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: EdwardsAffine,
    pub s: JubjubScalar,
}

/// Hashes scalar vectors and signs / verifies the resulting digest.
#[derive(Clone)]
pub struct SignatureBinder {
    poseidon_config: PoseidonConfig<Bn254Fr>,
}

impl SignatureBinder {
    pub fn new(poseidon_config: PoseidonConfig<Bn254Fr>) -> Self {
        Self { poseidon_config }
    }

    pub fn poseidon_config(&self) -> &PoseidonConfig<Bn254Fr> {
        &self.poseidon_config
    }

    /// Binding commitment to every element of the vector and to their order.
    pub fn hash(&self, vector: &ScalarVector) -> Bn254Fr {
        poseidon::hash(&self.poseidon_config, vector.as_slice())
    }

    /// Signs `msg` with a nonce drawn from the OS RNG.
    pub fn sign(&self, secret_key: &SecretKey, msg: Bn254Fr) -> Signature {
        self.sign_with_rng(secret_key, msg, &mut OsRng)
    }

    pub fn sign_with_rng<R: Rng + CryptoRng + ?Sized>(
        &self,
        secret_key: &SecretKey,
        msg: Bn254Fr,
        rng: &mut R,
    ) -> Signature {
        let generator = EdwardsAffine::generator();
        let public_key = (generator * secret_key.0).into_affine();

        let k = JubjubScalar::rand(rng);
        let r = (generator * k).into_affine();

        let e = self.challenge(&r, &public_key, msg);
        let e_scalar = JubjubScalar::from_le_bytes_mod_order(&e.into_bigint().to_bytes_le());

        Signature {
            r,
            s: k + e_scalar * secret_key.0,
        }
    }

    /// Checks `s·G == R + e·PK` for the challenge derived from `msg`.
    pub fn verify(&self, public_key: &PublicKey, signature: &Signature, msg: Bn254Fr) -> bool {
        let pk = public_key.point();
        let e = self.challenge(&signature.r, &pk, msg);

        let lhs = EdwardsAffine::generator().mul_bigint(signature.s.into_bigint());
        let rhs = pk.mul_bigint(e.into_bigint()) + signature.r;
        lhs == rhs
    }

    fn challenge(&self, r: &EdwardsAffine, public_key: &EdwardsAffine, msg: Bn254Fr) -> Bn254Fr {
        poseidon::hash(
            &self.poseidon_config,
            &[r.x, r.y, public_key.x, public_key.y, msg],
        )
    }
}

impl Default for SignatureBinder {
    fn default() -> Self {
        Self::new(get_poseidon_config())
    }
}
