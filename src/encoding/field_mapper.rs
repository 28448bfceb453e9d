// src/encoding/field_mapper.rs
//! Mapping of primitive credential values into the BN254 scalar field.
//!
//! Every leaf goes through the same two steps:
//! 1. `value_to_bytes`: text under a named [`TextEncoding`], integers as the
//!    little-endian base-256 decomposition, booleans as a single byte
//! 2. `bytes_to_bigint`: little-endian reconstruction of an unsigned integer
//!
//! The integer is then reduced modulo the field order.
//!
//! # Known limitation
//! Reduction is silent and lossy. Two distinct values that are congruent
//! modulo the field order (for example texts longer than 31 bytes that share
//! a residue) map to the same scalar. Whether the residual collision risk is
//! acceptable is left to the deployment; no range check is applied here.

use std::fmt;

use ark_bn254::Fr as Bn254Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_ff::PrimeField;
use num_bigint::BigUint;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ZkcError};
use crate::wallet::key_management::PublicKey;
use crate::zkp::poseidon::{self, get_poseidon_config};

/// Order of the BN254 scalar field.
static FIELD_ORDER: Lazy<BigUint> = Lazy::new(|| Bn254Fr::MODULUS.into());

pub fn field_order() -> &'static BigUint {
    &FIELD_ORDER
}

/// Scalar leaf of a credential document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafValue {
    Text(String),
    Integer(u64),
    BigInteger(BigUint),
    Boolean(bool),
}

impl LeafValue {
    /// Converts a JSON scalar into a leaf.
    ///
    /// Returns `Ok(None)` for `null` (absent). Negative integers, floats and
    /// nested structures are rejected: callers recurse into structures
    /// before reaching a leaf.
    pub fn from_json(path: &str, value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(LeafValue::Boolean(*b))),
            Value::String(s) => Ok(Some(LeafValue::Text(s.clone()))),
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    return Ok(Some(LeafValue::Integer(v)));
                }
                // Literal digits, kept intact by `arbitrary_precision`
                let literal = n.to_string();
                let (negative, digits) = match literal.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, literal.as_str()),
                };
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ZkcError::UnsupportedValue {
                        path: path.to_string(),
                        reason: format!("floating-point number {}", literal),
                    });
                }
                if negative {
                    return Err(ZkcError::NegativeInteger {
                        path: path.to_string(),
                        value: literal,
                    });
                }
                digits
                    .parse::<BigUint>()
                    .map(|v| Some(LeafValue::BigInteger(v)))
                    .map_err(|e| ZkcError::UnsupportedValue {
                        path: path.to_string(),
                        reason: e.to_string(),
                    })
            }
            Value::Array(_) | Value::Object(_) => Err(ZkcError::UnsupportedValue {
                path: path.to_string(),
                reason: "nested structure where a scalar was expected".to_string(),
            }),
        }
    }
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafValue::Text(s) => write!(f, "{:?}", s),
            LeafValue::Integer(v) => write!(f, "{}", v),
            LeafValue::BigInteger(v) => write!(f, "{}n", v),
            LeafValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for LeafValue {
    fn from(s: &str) -> Self {
        LeafValue::Text(s.to_string())
    }
}

impl From<String> for LeafValue {
    fn from(s: String) -> Self {
        LeafValue::Text(s)
    }
}

impl From<u64> for LeafValue {
    fn from(v: u64) -> Self {
        LeafValue::Integer(v)
    }
}

impl From<BigUint> for LeafValue {
    fn from(v: BigUint) -> Self {
        LeafValue::BigInteger(v)
    }
}

impl From<bool> for LeafValue {
    fn from(b: bool) -> Self {
        LeafValue::Boolean(b)
    }
}

/// Byte encoding applied to text leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// 7-bit ASCII; any other character is an error
    Ascii,
    /// Text is a standard base64 string and is decoded to its bytes
    Base64,
    /// Text is a bitcoin-alphabet base58 string and is decoded to its bytes
    Base58,
}

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf8",
            TextEncoding::Ascii => "ascii",
            TextEncoding::Base64 => "base64",
            TextEncoding::Base58 => "base58",
        }
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let failure = |reason: String| ZkcError::Encoding {
            encoding: self.name().to_string(),
            reason,
        };
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Ascii => {
                if text.is_ascii() {
                    Ok(text.as_bytes().to_vec())
                } else {
                    Err(failure(format!("non-ASCII text {:?}", text)))
                }
            }
            TextEncoding::Base64 => base64::decode(text).map_err(|e| failure(e.to_string())),
            TextEncoding::Base58 => bs58::decode(text)
                .into_vec()
                .map_err(|e| failure(e.to_string())),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered scalar field elements of one credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarVector(Vec<Bn254Fr>);

impl ScalarVector {
    pub fn new(elements: Vec<Bn254Fr>) -> Self {
        Self(elements)
    }

    pub fn as_slice(&self) -> &[Bn254Fr] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<Bn254Fr> {
        self.0.get(position).copied()
    }
}

/// Little-endian unsigned byte decomposition of an integer.
///
/// Zero decomposes to the empty sequence.
pub fn integer_to_bytes(mut value: u64) -> Vec<u8> {
    let mut bytes = Vec::new();
    while value != 0 {
        bytes.push((value % 256) as u8);
        value /= 256;
    }
    bytes
}

/// Inverse of the little-endian decomposition; `[]` reconstructs to `0`.
pub fn bytes_to_bigint(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_le(bytes)
}

/// Reduces an unsigned integer modulo the field order.
pub fn reduce_to_field(value: &BigUint) -> Bn254Fr {
    Bn254Fr::from(value % field_order())
}

/// Converts credential leaves into field elements.
#[derive(Clone)]
pub struct FieldMapper {
    encoding: TextEncoding,
    poseidon_config: PoseidonConfig<Bn254Fr>,
}

impl FieldMapper {
    pub fn new(encoding: TextEncoding) -> Self {
        Self::with_poseidon(encoding, get_poseidon_config())
    }

    pub fn with_poseidon(encoding: TextEncoding, poseidon_config: PoseidonConfig<Bn254Fr>) -> Self {
        Self {
            encoding,
            poseidon_config,
        }
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Byte form of a leaf.
    pub fn value_to_bytes(&self, value: &LeafValue) -> Result<Vec<u8>> {
        match value {
            LeafValue::Text(text) => self.encoding.encode(text),
            LeafValue::Integer(v) => Ok(integer_to_bytes(*v)),
            LeafValue::BigInteger(v) => {
                if v.bits() == 0 {
                    Ok(Vec::new())
                } else {
                    Ok(v.to_bytes_le())
                }
            }
            LeafValue::Boolean(b) => Ok(vec![u8::from(*b)]),
        }
    }

    /// Unreduced integer form of a leaf.
    pub fn to_bigint(&self, value: &LeafValue) -> Result<BigUint> {
        Ok(bytes_to_bigint(&self.value_to_bytes(value)?))
    }

    /// Field element of a scalar leaf, reduced modulo the field order.
    pub fn to_field(&self, value: &LeafValue) -> Result<Bn254Fr> {
        Ok(reduce_to_field(&self.to_bigint(value)?))
    }

    /// Field element standing for a base58 public key leaf.
    ///
    /// The key is decoded to its curve point and the point coordinates are
    /// hashed, rather than reducing the raw text bytes.
    pub fn public_key_to_field(&self, encoded: &str) -> Result<Bn254Fr> {
        let key = PublicKey::from_base58(encoded)?;
        Ok(self.public_key_digest(&key))
    }

    pub fn public_key_digest(&self, key: &PublicKey) -> Bn254Fr {
        poseidon::hash(&self.poseidon_config, &key.to_fields())
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new(TextEncoding::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::key_management::KeyManager;
    use serde_json::json;

    #[test]
    fn test_zero_decomposes_to_empty() {
        let mapper = FieldMapper::default();
        assert!(mapper.value_to_bytes(&LeafValue::Integer(0)).unwrap().is_empty());
        assert!(mapper
            .value_to_bytes(&LeafValue::BigInteger(BigUint::from(0u8)))
            .unwrap()
            .is_empty());
        assert_eq!(bytes_to_bigint(&[]), BigUint::from(0u8));
    }

    #[test]
    fn test_little_endian_decomposition() {
        assert_eq!(integer_to_bytes(1), vec![1]);
        assert_eq!(integer_to_bytes(256), vec![0, 1]);
        assert_eq!(integer_to_bytes(0x0102_0304), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_integer_round_trip() {
        let mapper = FieldMapper::default();
        for v in [0u64, 1, 255, 256, 65_535, 1_700_000_000_000, u64::MAX] {
            let bytes = mapper.value_to_bytes(&LeafValue::Integer(v)).unwrap();
            assert_eq!(bytes_to_bigint(&bytes), BigUint::from(v));
        }

        let big = BigUint::from(u64::MAX) * BigUint::from(u64::MAX) + BigUint::from(17u8);
        let bytes = mapper.value_to_bytes(&LeafValue::BigInteger(big.clone())).unwrap();
        assert_eq!(bytes_to_bigint(&bytes), big);
    }

    #[test]
    fn test_text_and_boolean() {
        let mapper = FieldMapper::default();
        assert_eq!(mapper.value_to_bytes(&LeafValue::from("ab")).unwrap(), b"ab".to_vec());
        assert_eq!(mapper.value_to_bytes(&LeafValue::Boolean(true)).unwrap(), vec![1]);
        assert_eq!(mapper.value_to_bytes(&LeafValue::Boolean(false)).unwrap(), vec![0]);

        // "ab" little-endian: 0x61 + 0x62 * 256
        assert_eq!(
            mapper.to_field(&LeafValue::from("ab")).unwrap(),
            Bn254Fr::from(0x61u64 + 0x62 * 256)
        );
    }

    #[test]
    fn test_named_encodings() {
        assert!(TextEncoding::Ascii.encode("caf\u{e9}").is_err());
        assert_eq!(TextEncoding::Base64.encode("AQI=").unwrap(), vec![1, 2]);
        assert!(matches!(
            TextEncoding::Base58.encode("0"),
            Err(ZkcError::Encoding { .. })
        ));
    }

    #[test]
    fn test_reduction_wraps_modulo_order() {
        let mapper = FieldMapper::default();
        let order = field_order().clone();
        let wrapped = LeafValue::BigInteger(order + BigUint::from(5u8));
        assert_eq!(mapper.to_field(&wrapped).unwrap(), Bn254Fr::from(5u64));
    }

    #[test]
    fn test_json_leaf_rejections() {
        assert!(LeafValue::from_json("x", &json!(null)).unwrap().is_none());
        assert_eq!(
            LeafValue::from_json("x", &json!(0)).unwrap(),
            Some(LeafValue::Integer(0))
        );
        assert!(matches!(
            LeafValue::from_json("x", &json!(-3)),
            Err(ZkcError::NegativeInteger { value, .. }) if value == "-3"
        ));
        assert!(matches!(
            LeafValue::from_json("x", &json!(1.5)),
            Err(ZkcError::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn test_json_integer_beyond_u64() {
        let doc: Value =
            serde_json::from_str(r#"{"n": 18446744073709551616, "m": -18446744073709551616}"#).unwrap();
        let expected = BigUint::from(u64::MAX) + BigUint::from(1u8);

        assert_eq!(
            LeafValue::from_json("n", &doc["n"]).unwrap(),
            Some(LeafValue::BigInteger(expected.clone()))
        );
        assert!(matches!(
            LeafValue::from_json("m", &doc["m"]),
            Err(ZkcError::NegativeInteger { .. })
        ));

        let mapper = FieldMapper::default();
        assert_eq!(
            mapper.value_to_bytes(&LeafValue::BigInteger(expected)).unwrap(),
            vec![0, 0, 0, 0, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_public_key_digest() {
        let mapper = FieldMapper::default();
        let keys = KeyManager::new();
        let encoded = keys.public_key_base58().unwrap();

        let digest = mapper.public_key_to_field(&encoded).unwrap();
        assert_eq!(digest, mapper.public_key_digest(&keys.public_key));
        assert_ne!(digest, mapper.to_field(&LeafValue::Text(encoded)).unwrap());
    }
}
