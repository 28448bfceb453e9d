// src/services/credential_issuer.rs
//! Credential Issuer Service
//!
//! Encodes credentials against the configured schema and signs the resulting
//! scalar-vector hash with the issuer key. The signed bundle is everything a
//! holder needs to later prove possession in zero knowledge.

use ark_bn254::Fr as Bn254Fr;
use log::{debug, info};

use crate::encoding::field_mapper::{FieldMapper, ScalarVector};
use crate::encoding::schema::CredentialSchema;
use crate::error::{Result, ZkcError};
use crate::models::credential::{Credential, Identifier, Party, Subject};
use crate::utils::crypto::{Signature, SignatureBinder};
use crate::wallet::key_management::{KeyManager, PublicKey};

/// A credential together with its encoding and issuer signature.
#[derive(Debug, Clone)]
pub struct SignedCredential {
    pub credential: Credential,
    pub fields: ScalarVector,
    pub hash: Bn254Fr,
    pub signature: Signature,
    pub issuer_public_key: PublicKey,
}

/// Service holding an issuer key pair and the encoding rules it signs under.
#[derive(Clone)]
pub struct CredentialIssuer {
    keys: KeyManager,
    id_type: u64,
    mapper: FieldMapper,
    schema: CredentialSchema,
    binder: SignatureBinder,
}

impl CredentialIssuer {
    /// Creates a new CredentialIssuer instance
    ///
    /// # Arguments
    /// * `keys` - Issuer signing key pair
    /// * `id_type` - Issuer role written into `issuer.id.type`
    /// * `mapper` - Field mapper (fixes the text encoding)
    /// * `schema` - Layout every issued credential must follow
    pub fn new(keys: KeyManager, id_type: u64, mapper: FieldMapper, schema: CredentialSchema) -> Self {
        Self {
            keys,
            id_type,
            mapper,
            schema,
            binder: SignatureBinder::default(),
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.keys.public_key
    }

    /// Issuer identifier to embed in credentials.
    pub fn identifier(&self) -> Result<Identifier> {
        Ok(Identifier {
            id_type: self.id_type,
            publickey: self.keys.public_key_base58()?,
        })
    }

    /// Builds an unsigned credential naming this issuer.
    pub fn draft(
        &self,
        schema_id: u64,
        issuance_date: u64,
        expiration_date: u64,
        subject: Identifier,
    ) -> Result<Credential> {
        Ok(Credential {
            issuer: Party {
                id: self.identifier()?,
            },
            schema: schema_id,
            issuance_date,
            expiration_date,
            subject: Subject {
                id: subject,
                claims: Default::default(),
            },
        })
    }

    /// Encodes and signs a credential.
    ///
    /// # Errors
    /// - `IssuerKeyMismatch` if `issuer.id.publickey` is not this issuer's key
    /// - any encoding or schema error from [`CredentialSchema::to_fields`]
    pub fn issue(&self, credential: Credential) -> Result<SignedCredential> {
        if credential.issuer.id.publickey != self.keys.public_key_base58()? {
            return Err(ZkcError::IssuerKeyMismatch);
        }

        let fields = self.schema.to_fields(&credential, &self.mapper)?;
        let hash = self.binder.hash(&fields);
        debug!("Credential hash {}", hash);
        let signature = self.binder.sign(self.keys.secret_key(), hash);
        info!("Issued credential with schema {}", credential.schema);

        Ok(SignedCredential {
            credential,
            fields,
            hash,
            signature,
            issuer_public_key: self.keys.public_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issuer() -> CredentialIssuer {
        CredentialIssuer::new(
            KeyManager::new(),
            1,
            FieldMapper::default(),
            CredentialSchema::single_claim("twitter", &["id", "username"]),
        )
    }

    fn subject() -> Identifier {
        Identifier {
            id_type: 1,
            publickey: KeyManager::new().public_key_base58().unwrap(),
        }
    }

    #[test]
    fn test_issue_signs_hash() {
        let issuer = issuer();
        let credential = issuer
            .draft(2, 1_700_000_000_000, 0, subject())
            .unwrap()
            .with_claim("twitter", json!({ "username": "pvldshvv", "id": "twitter" }));

        let signed = issuer.issue(credential).unwrap();
        let binder = SignatureBinder::default();
        assert_eq!(signed.fields.len(), 9);
        assert_eq!(signed.hash, binder.hash(&signed.fields));
        assert!(binder.verify(issuer.public_key(), &signed.signature, signed.hash));
    }

    #[test]
    fn test_refuses_foreign_issuer_key() {
        let issuer = issuer();
        let mut credential = issuer
            .draft(2, 1_700_000_000_000, 0, subject())
            .unwrap()
            .with_claim("twitter", json!({ "username": "pvldshvv", "id": "twitter" }));
        credential.issuer.id.publickey = KeyManager::new().public_key_base58().unwrap();

        assert!(matches!(
            issuer.issue(credential),
            Err(ZkcError::IssuerKeyMismatch)
        ));
    }
}
