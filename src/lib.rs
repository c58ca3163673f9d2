//! SoulPost library
//!
//! Exposes the configuration model shared by the binary and integration tests

pub mod config;

pub use config::{check_compose_url, Config};
