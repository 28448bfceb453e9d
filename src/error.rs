// src/error.rs
//! Error types shared by every stage of the credential pipeline.

use ark_relations::r1cs::SynthesisError;
use ark_serialize::SerializationError;
use thiserror::Error;

/// Main error type for credential encoding, signing and proving.
#[derive(Error, Debug)]
pub enum ZkcError {
    #[error("unsupported value at {path}: {reason}")]
    UnsupportedValue { path: String, reason: String },

    #[error("negative integer {value} at {path} has no canonical byte decomposition")]
    NegativeInteger { path: String, value: String },

    #[error("text encoding failed ({encoding}): {reason}")]
    Encoding { encoding: String, reason: String },

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("credential has {actual} leaves, schema expects {expected}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("schema mismatch at position {position}: expected `{expected}`, found `{found}`")]
    SchemaMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("credential issuer key does not match the signing key")]
    IssuerKeyMismatch,

    #[error("circuit unsatisfied: {0}")]
    Unsatisfied(String),

    #[error("proof was produced by a different compiled circuit (expected {expected}, got {actual})")]
    ArtifactMismatch { expected: String, actual: String },

    #[error("constraint synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<SerializationError> for ZkcError {
    fn from(err: SerializationError) -> Self {
        ZkcError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ZkcError {
    fn from(err: serde_json::Error) -> Self {
        ZkcError::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for ZkcError {
    fn from(err: base64::DecodeError) -> Self {
        ZkcError::Serialization(format!("base64 decoding failed: {}", err))
    }
}

impl From<config::ConfigError> for ZkcError {
    fn from(err: config::ConfigError) -> Self {
        ZkcError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ZkcError>;
