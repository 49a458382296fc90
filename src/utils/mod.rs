// src/utils/mod.rs
//! Common utilities: configuration and error types

pub mod config;
pub mod errors;
