// src/encoding/mod.rs
pub mod canonical;
pub mod field_mapper;
pub mod schema;
