// src/encoding/schema.rs
//! Declared credential layouts.
//!
//! A [`CredentialSchema`] lists the canonical paths a credential must flatten
//! to, in order, and how each leaf is turned into a field element. Encoding
//! checks the canonical form against the declaration so that a credential
//! with an extra, missing or renamed claim is a reported error instead of a
//! silently misaligned scalar vector.

use ark_bn254::Fr as Bn254Fr;
use log::debug;

use crate::encoding::canonical::{canonicalize, CanonicalForm};
use crate::encoding::field_mapper::{FieldMapper, LeafValue, ScalarVector};
use crate::error::{Result, ZkcError};
use crate::models::credential::Credential;

/// Paths shared by every layout, in canonical order.
pub const HEADER_PATHS: [&str; 7] = [
    "issuer.id.type",
    "issuer.id.publickey",
    "schema",
    "issuanceDate",
    "expirationDate",
    "subject.id.type",
    "subject.id.publickey",
];

/// Position of `issuer.id.type` in every layout.
pub const ISSUER_TYPE_POSITION: usize = 0;

/// How a leaf becomes a field element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Byte decomposition reduced modulo the field order
    Scalar,
    /// Base58 public key, hashed from its curve point coordinates
    PublicKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub path: String,
    pub kind: FieldKind,
}

impl SchemaField {
    pub fn scalar(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FieldKind::Scalar,
        }
    }

    pub fn public_key(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FieldKind::PublicKey,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSchema {
    fields: Vec<SchemaField>,
}

impl CredentialSchema {
    /// Schema from explicitly declared fields, in canonical order.
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    /// Header paths followed by the leaves of one claim object.
    ///
    /// Leaf keys are sorted, matching the canonical order of the claim.
    pub fn single_claim(claim_name: &str, leaf_keys: &[&str]) -> Self {
        let mut keys = leaf_keys.to_vec();
        keys.sort_unstable();

        let mut fields: Vec<SchemaField> = HEADER_PATHS.iter().map(|path| field_for_path(path)).collect();
        fields.extend(
            keys.iter()
                .map(|key| SchemaField::scalar(format!("subject.{}.{}", claim_name, key))),
        );
        Self { fields }
    }

    /// Derives the layout of a template credential.
    ///
    /// `*.id.publickey` paths of the issuer and subject are public keys;
    /// everything else is a scalar.
    pub fn from_credential(template: &Credential) -> Result<Self> {
        let form = canonicalize(template)?;
        Ok(Self {
            fields: form.paths().map(field_for_path).collect(),
        })
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Position of a path in the layout.
    pub fn position(&self, path: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.path == path)
    }

    /// Checks that a canonical form has exactly the declared paths.
    pub fn check(&self, form: &CanonicalForm) -> Result<()> {
        if form.len() != self.arity() {
            return Err(ZkcError::ArityMismatch {
                expected: self.arity(),
                actual: form.len(),
            });
        }
        for (position, (field, entry)) in self.fields.iter().zip(form.entries()).enumerate() {
            if field.path != entry.path {
                return Err(ZkcError::SchemaMismatch {
                    position,
                    expected: field.path.clone(),
                    found: entry.path.clone(),
                });
            }
        }
        Ok(())
    }

    /// Canonicalizes, checks and maps a credential to its scalar vector.
    pub fn to_fields(&self, credential: &Credential, mapper: &FieldMapper) -> Result<ScalarVector> {
        let form = canonicalize(credential)?;
        self.check(&form)?;

        let elements = self
            .fields
            .iter()
            .zip(form.entries())
            .map(|(field, entry)| encode_entry(mapper, field, &entry.value))
            .collect::<Result<Vec<Bn254Fr>>>()?;

        debug!("Encoded credential into {} field elements", elements.len());
        Ok(ScalarVector::new(elements))
    }
}

fn field_for_path(path: &str) -> SchemaField {
    if path == "issuer.id.publickey" || path == "subject.id.publickey" {
        SchemaField::public_key(path)
    } else {
        SchemaField::scalar(path)
    }
}

fn encode_entry(mapper: &FieldMapper, field: &SchemaField, value: &LeafValue) -> Result<Bn254Fr> {
    match (field.kind, value) {
        (FieldKind::Scalar, value) => mapper.to_field(value),
        (FieldKind::PublicKey, LeafValue::Text(encoded)) => mapper.public_key_to_field(encoded),
        (FieldKind::PublicKey, other) => Err(ZkcError::UnsupportedValue {
            path: field.path.clone(),
            reason: format!("public key must be text, found {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::key_management::KeyManager;
    use serde_json::json;

    fn credential(claims: serde_json::Value) -> Credential {
        let issuer = KeyManager::new().public_key_base58().unwrap();
        let subject = KeyManager::new().public_key_base58().unwrap();
        let mut doc = json!({
            "issuer": { "id": { "type": 1, "publickey": issuer } },
            "schema": 2,
            "issuanceDate": 1_700_000_000_000u64,
            "expirationDate": 0,
            "subject": { "id": { "type": 1, "publickey": subject } }
        });
        for (k, v) in claims.as_object().unwrap() {
            doc["subject"][k] = v.clone();
        }
        serde_json::from_value(doc).unwrap()
    }

    #[test]
    fn test_single_claim_layout() {
        let schema = CredentialSchema::single_claim("twitter", &["username", "id"]);
        assert_eq!(schema.arity(), 9);
        assert_eq!(schema.fields()[1].kind, FieldKind::PublicKey);
        assert_eq!(schema.fields()[6].kind, FieldKind::PublicKey);
        assert_eq!(schema.position("subject.twitter.id"), Some(7));
        assert_eq!(schema.position("subject.twitter.username"), Some(8));
    }

    #[test]
    fn test_to_fields_is_deterministic() {
        let c = credential(json!({ "twitter": { "username": "pvldshvv", "id": "twitter" } }));
        let schema = CredentialSchema::single_claim("twitter", &["id", "username"]);
        let mapper = FieldMapper::default();

        let a = schema.to_fields(&c, &mapper).unwrap();
        let b = schema.to_fields(&c, &mapper).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 9);
        assert_eq!(a.get(ISSUER_TYPE_POSITION), Some(Bn254Fr::from(1u64)));
        assert_eq!(a.get(2), Some(Bn254Fr::from(2u64)));
        assert_eq!(a.get(4), Some(Bn254Fr::from(0u64)));
    }

    #[test]
    fn test_derived_schema_matches_declared() {
        let c = credential(json!({ "twitter": { "username": "pvldshvv", "id": "twitter" } }));
        let derived = CredentialSchema::from_credential(&c).unwrap();
        assert_eq!(derived, CredentialSchema::single_claim("twitter", &["id", "username"]));
    }

    #[test]
    fn test_arity_mismatch() {
        let c = credential(json!({
            "twitter": { "username": "pvldshvv", "id": "twitter" },
            "email": { "address": "x@example.com" }
        }));
        let schema = CredentialSchema::single_claim("twitter", &["id", "username"]);
        assert!(matches!(
            schema.to_fields(&c, &FieldMapper::default()),
            Err(ZkcError::ArityMismatch { expected: 9, actual: 10 })
        ));
    }

    #[test]
    fn test_path_mismatch() {
        let c = credential(json!({ "github": { "username": "pvldshvv", "id": "github" } }));
        let schema = CredentialSchema::single_claim("twitter", &["id", "username"]);
        match schema.to_fields(&c, &FieldMapper::default()) {
            Err(ZkcError::SchemaMismatch { position, expected, found }) => {
                assert_eq!(position, 7);
                assert_eq!(expected, "subject.twitter.id");
                assert_eq!(found, "subject.github.id");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_public_key_leaf() {
        let mut c = credential(json!({ "twitter": { "username": "pvldshvv", "id": "twitter" } }));
        c.subject.id.publickey = "not-a-key".to_string();
        let schema = CredentialSchema::single_claim("twitter", &["id", "username"]);
        assert!(matches!(
            schema.to_fields(&c, &FieldMapper::default()),
            Err(ZkcError::InvalidPublicKey(_))
        ));
    }
}
