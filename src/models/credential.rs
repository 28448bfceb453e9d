// src/models/credential.rs
//! Identity credential data model.
//!
//! A credential names its issuer and subject by [`Identifier`] and carries an
//! open-ended set of subject claims. Claims are arbitrary JSON objects whose
//! leaves are strings, non-negative integers or booleans.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A typed public key reference.
///
/// # Fields
/// - `id_type`: role / key-scheme discriminator (serialized as `type`)
/// - `publickey`: base58 encoding of a compressed Baby Jubjub point
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub id_type: u64,
    pub publickey: String,
}

/// Wrapper for the `{ "id": Identifier }` shape used by the issuer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub id: Identifier,
}

/// Credential subject: its identifier plus free-form claims.
///
/// The `id` key is consumed by [`Subject::id`]; every other key lands in
/// `claims` in document order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Subject {
    pub id: Identifier,
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

/// An identity credential as produced by the issuing party.
///
/// # Fields
/// - `issuer`: issuing party's identifier
/// - `schema`: numeric schema discriminator
/// - `issuance_date`: epoch milliseconds
/// - `expiration_date`: epoch milliseconds, `0` when the credential never expires
/// - `subject`: subject identifier and claims
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub issuer: Party,
    pub schema: u64,
    pub issuance_date: u64,
    pub expiration_date: u64,
    pub subject: Subject,
}

impl Credential {
    /// Adds (or replaces) a subject claim, keeping insertion order.
    pub fn with_claim(mut self, name: impl Into<String>, claim: Value) -> Self {
        self.subject.claims.insert(name.into(), claim);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_camel_case_document() {
        let doc = json!({
            "issuer": { "id": { "type": 1, "publickey": "abc" } },
            "schema": 2,
            "issuanceDate": 1000,
            "expirationDate": 0,
            "subject": {
                "id": { "type": 1, "publickey": "def" },
                "twitter": { "username": "pvldshvv", "id": "twitter" }
            }
        });

        let credential: Credential = serde_json::from_value(doc).unwrap();
        assert_eq!(credential.issuer.id.id_type, 1);
        assert_eq!(credential.issuance_date, 1000);
        assert_eq!(credential.subject.id.publickey, "def");
        assert_eq!(credential.subject.claims.len(), 1);

        let keys: Vec<&String> = credential.subject.claims["twitter"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, vec!["username", "id"]);
    }
}
