// src/main.rs

//! # zk-credential - Demo Driver
//!
//! Runs the full pipeline once: issue a credential, compile the policy
//! circuit, prove possession of the credential and verify the proof.
//!
//! ## Configuration
//! See [`zk_credential::config`]. `RUST_LOG` overrides `log_level`.

use std::sync::Arc;

use anyhow::Context;
use log::info;
use serde_json::json;
use zk_credential::config::AppConfig;
use zk_credential::prelude::*;
use zk_credential::utils::serialization::{serialize, serialize_proof};

fn main() -> anyhow::Result<()> {
    let app = AppConfig::load().context("failed to load configuration")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(app.log_level.as_str()))
        .init();

    let mapper = FieldMapper::new(app.text_encoding);
    let issuer = CredentialIssuer::new(
        KeyManager::new(),
        app.policy.issuer_type,
        mapper.clone(),
        app.credential_schema(),
    );
    let subject = KeyManager::new();

    let issued_at = chrono::Utc::now().timestamp_millis() as u64;
    let mut claim = serde_json::Map::new();
    for (key, value) in app.policy.claim_keys.iter().zip(&app.policy.claim_leaves) {
        claim.insert(key.clone(), json!(value));
    }
    let credential = issuer
        .draft(
            app.schema_id,
            issued_at,
            issued_at + 1000,
            Identifier {
                id_type: 1,
                publickey: subject.public_key_base58()?,
            },
        )?
        .with_claim(app.policy.claim_name.clone(), serde_json::Value::Object(claim));
    info!("Credential: {}", serialize(&sort(&credential))?);

    let signed = issuer.issue(credential).context("failed to issue credential")?;

    let circuit = Arc::new(
        CompiledCircuit::compile(app.circuit_policy(), &mapper).context("failed to compile circuit")?,
    );
    info!("Compiled circuit {} for {:?}", circuit.artifact_id(), circuit.policy());
    let proof = generate_credential_proof(&circuit, &signed).context("failed to create proof")?;
    info!("Proof: {}", serialize_proof(&proof)?);

    let verifier = Verifier::new(circuit, *issuer.public_key());
    let verified = verifier.verify(&proof)?;
    println!("Verify result: {}", verified);

    Ok(())
}
