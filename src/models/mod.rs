// src/models/mod.rs
pub mod credential;
