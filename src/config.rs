// src/config.rs
//! Runtime configuration.
//!
//! Values are layered, later sources overriding earlier ones:
//! 1. built-in defaults
//! 2. optional `zkc.toml` (or `.json` / `.yaml`) in the working directory
//! 3. `ZKC_*` environment variables, `__` separating nested keys
//!    (e.g. `ZKC_POLICY__ISSUER_TYPE=1`); a `.env` file is loaded first
//!
//! ## Keys
//! - `log_level`: default `env_logger` filter when `RUST_LOG` is unset
//! - `text_encoding`: `utf8` | `ascii` | `base64` | `base58`
//! - `schema_id`: numeric schema of issued demo credentials
//! - `policy.issuer_type`: required issuer role
//! - `policy.claim_name`: claim object checked by the circuit
//! - `policy.claim_keys`: the claim's two leaf keys, sorted
//! - `policy.claim_leaves`: required values of those leaves, in canonical key order

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::encoding::field_mapper::{LeafValue, TextEncoding};
use crate::encoding::schema::CredentialSchema;
use crate::error::{Result, ZkcError};
use crate::zkp::circuit::CircuitPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    pub issuer_type: u64,
    pub claim_name: String,
    pub claim_keys: Vec<String>,
    pub claim_leaves: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub log_level: String,
    pub text_encoding: TextEncoding,
    pub schema_id: u64,
    pub policy: PolicyConfig,
}

impl AppConfig {
    /// Loads configuration from defaults, `zkc.*` and the environment.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let config = Config::builder()
            .set_default("log_level", "info")?
            .set_default("text_encoding", "utf8")?
            .set_default("schema_id", 2)?
            .set_default("policy.issuer_type", 1)?
            .set_default("policy.claim_name", "twitter")?
            .set_default("policy.claim_keys", vec!["id", "username"])?
            .set_default("policy.claim_leaves", vec!["twitter", "pvldshvv"])?
            .add_source(File::with_name("zkc").required(false))
            .add_source(
                Environment::with_prefix("ZKC")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("policy.claim_keys")
                    .with_list_parse_key("policy.claim_leaves")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> Result<()> {
        if self.policy.claim_keys.len() != 2 || self.policy.claim_leaves.len() != 2 {
            return Err(ZkcError::Config(format!(
                "policy needs exactly two claim keys and two claim leaves, got {} and {}",
                self.policy.claim_keys.len(),
                self.policy.claim_leaves.len()
            )));
        }
        if self.policy.claim_keys[0] >= self.policy.claim_keys[1] {
            return Err(ZkcError::Config(
                "policy.claim_keys must be distinct and in lexicographic order".to_string(),
            ));
        }
        Ok(())
    }

    /// Circuit policy described by the `policy` section.
    pub fn circuit_policy(&self) -> CircuitPolicy {
        CircuitPolicy::new(
            self.policy.issuer_type,
            [
                LeafValue::from(self.policy.claim_leaves[0].as_str()),
                LeafValue::from(self.policy.claim_leaves[1].as_str()),
            ],
        )
    }

    /// Layout of credentials carrying the policy claim.
    pub fn credential_schema(&self) -> CredentialSchema {
        let keys: Vec<&str> = self.policy.claim_keys.iter().map(String::as_str).collect();
        CredentialSchema::single_claim(&self.policy.claim_name, &keys)
    }
}
