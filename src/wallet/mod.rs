// src/wallet/mod.rs
pub mod key_management;
pub mod zkp_generation;
