//! Configuration management
//!
//! Connection profiles and their on-disk persistence.

pub mod connections;

pub use connections::{ConnectionConfig, ConnectionStore, SslMode};
