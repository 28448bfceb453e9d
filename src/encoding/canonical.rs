// src/encoding/canonical.rs
//! Deterministic canonical form of a credential.
//!
//! Canonicalization rules:
//! 1. Issuer, schema and dates keep their fixed positions.
//! 2. Identifiers are ordered `type`, then `publickey`.
//! 3. `subject.id` is pinned first; every other subject claim key is sorted
//!    lexicographically by UTF-16 code units, recursively at every nesting
//!    depth. This matches JavaScript's default key sort, which differs from
//!    UTF-8 byte order for keys mixing U+E000..U+FFFF with astral characters.
//! 4. Arrays keep their element order.
//!
//! Flattening walks the sorted document depth-first and yields one
//! `(path, value)` entry per present leaf. `null` leaves are skipped;
//! `0`, `false` and `""` are kept.

use serde_json::{Map, Value};

use crate::encoding::field_mapper::LeafValue;
use crate::error::Result;
use crate::models::credential::{Credential, Identifier, Party, Subject};

/// One leaf of the canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalEntry {
    /// Dot-joined key path, array positions as decimal indices
    pub path: String,
    pub value: LeafValue,
}

/// Ordered `(path, value)` leaves of a sorted credential.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanonicalForm {
    entries: Vec<CanonicalEntry>,
}

impl CanonicalForm {
    pub fn entries(&self) -> &[CanonicalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.path.as_str())
    }

    pub fn values(&self) -> Vec<LeafValue> {
        self.entries.iter().map(|entry| entry.value.clone()).collect()
    }

    fn push(&mut self, path: String, value: LeafValue) {
        self.entries.push(CanonicalEntry { path, value });
    }
}

/// Rebuilds the credential with `subject.id` first and all claim keys deep
/// sorted. Idempotent.
pub fn sort(credential: &Credential) -> Credential {
    let claim_keys = sorted_keys(&credential.subject.claims);

    let mut claims = Map::new();
    for key in claim_keys {
        claims.insert(key.clone(), sort_value(&credential.subject.claims[key]));
    }

    Credential {
        issuer: Party {
            id: credential.issuer.id.clone(),
        },
        schema: credential.schema,
        issuance_date: credential.issuance_date,
        expiration_date: credential.expiration_date,
        subject: Subject {
            id: credential.subject.id.clone(),
            claims,
        },
    }
}

fn sorted_keys(map: &Map<String, Value>) -> Vec<&String> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));
    keys
}

fn sort_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let keys = sorted_keys(map);
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_value(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_value).collect()),
        other => other.clone(),
    }
}

/// Depth-first flattening of an already sorted credential.
///
/// Claims are walked in their stored key order; call [`sort`] first (or use
/// [`canonicalize`]) to get the canonical order.
pub fn flatten(sorted: &Credential) -> Result<CanonicalForm> {
    let mut form = CanonicalForm::default();

    push_identifier(&mut form, "issuer.id", &sorted.issuer.id);
    form.push("schema".to_string(), LeafValue::Integer(sorted.schema));
    form.push("issuanceDate".to_string(), LeafValue::Integer(sorted.issuance_date));
    form.push("expirationDate".to_string(), LeafValue::Integer(sorted.expiration_date));
    push_identifier(&mut form, "subject.id", &sorted.subject.id);

    for (key, value) in &sorted.subject.claims {
        flatten_value(&mut form, format!("subject.{}", key), value)?;
    }

    Ok(form)
}

fn push_identifier(form: &mut CanonicalForm, prefix: &str, id: &Identifier) {
    form.push(format!("{}.type", prefix), LeafValue::Integer(id.id_type));
    form.push(
        format!("{}.publickey", prefix),
        LeafValue::Text(id.publickey.clone()),
    );
}

fn flatten_value(form: &mut CanonicalForm, path: String, value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_value(form, format!("{}.{}", path, key), child)?;
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_value(form, format!("{}.{}", path, index), child)?;
            }
        }
        leaf => {
            if let Some(value) = LeafValue::from_json(&path, leaf)? {
                form.push(path, value);
            }
        }
    }
    Ok(())
}

/// `flatten(sort(credential))`.
pub fn canonicalize(credential: &Credential) -> Result<CanonicalForm> {
    flatten(&sort(credential))
}

/// Ordered leaf values of the canonical form.
pub fn to_values(credential: &Credential) -> Result<Vec<LeafValue>> {
    Ok(canonicalize(credential)?.values())
}
