// src/zkp/mod.rs
pub mod circuit;
pub mod poseidon;
pub mod proof_generation;
pub mod proof_verification;
