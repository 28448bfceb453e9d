// src/wallet/key_management.rs
//! Key management for issuers and subjects.
//!
//! Keys live on Baby Jubjub (`ark-ed-on-bn254`), the twisted Edwards curve
//! whose base field is the BN254 scalar field. Point coordinates are
//! therefore native field elements of the proof circuit, which is what lets
//! the circuit check issuer signatures without non-native arithmetic.
//!
//! Public keys travel inside credentials as base58 text of the compressed
//! point encoding.

use ark_bn254::Fr as Bn254Fr;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ed_on_bn254::{EdwardsAffine, Fr as JubjubScalar};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::UniformRand;
use rand::rngs::OsRng;
use rand::{CryptoRng, Rng};

use crate::error::{Result, ZkcError};

/// Secret scalar of a key pair. Never serialized.
#[derive(Clone)]
pub struct SecretKey(pub(crate) JubjubScalar);

/// A Baby Jubjub public key in the prime-order subgroup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(pub(crate) EdwardsAffine);

impl PublicKey {
    /// Affine point behind this key.
    pub fn point(&self) -> EdwardsAffine {
        self.0
    }

    /// Affine coordinates `(x, y)` as BN254 scalar field elements.
    pub fn to_fields(&self) -> [Bn254Fr; 2] {
        [self.0.x, self.0.y]
    }

    /// Compressed point bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.0.serialize_compressed(&mut bytes)?;
        Ok(bytes)
    }

    /// Parses compressed point bytes, rejecting points off the curve or
    /// outside the prime-order subgroup.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let point = EdwardsAffine::deserialize_compressed(bytes)
            .map_err(|e| ZkcError::InvalidPublicKey(e.to_string()))?;
        Ok(Self(point))
    }

    /// Base58 text form used inside credential identifiers.
    pub fn to_base58(&self) -> Result<String> {
        Ok(bs58::encode(self.to_bytes()?).into_string())
    }

    /// Parses the base58 text form produced by [`PublicKey::to_base58`].
    pub fn from_base58(encoded: &str) -> Result<Self> {
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| ZkcError::InvalidPublicKey(format!("base58 decoding failed: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}

/// A Baby Jubjub signing key pair.
///
/// This struct provides:
/// - Key generation from the OS RNG or a caller-supplied RNG
/// - Public key derivation
/// - Access to the secret scalar for the signature scheme in
///   [`crate::utils::crypto`]
#[derive(Clone)]
pub struct KeyManager {
    /// Secret scalar (never exposed outside the crate)
    secret_key: SecretKey,
    /// Derived public key for verification
    pub public_key: PublicKey,
}

impl KeyManager {
    /// Generates a new key pair from the operating system RNG.
    pub fn new() -> Self {
        Self::generate(&mut OsRng)
    }

    /// Generates a new key pair from the given RNG.
    pub fn generate<R: Rng + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let scalar = JubjubScalar::rand(rng);
        Self::from_secret(SecretKey(scalar))
    }

    /// Rebuilds a key pair from a known secret scalar.
    pub fn from_secret(secret_key: SecretKey) -> Self {
        let public_key = PublicKey((EdwardsAffine::generator() * secret_key.0).into_affine());
        KeyManager {
            secret_key,
            public_key,
        }
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Base58 identifier text of the public key.
    pub fn public_key_base58(&self) -> Result<String> {
        self.public_key.to_base58()
    }
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}
