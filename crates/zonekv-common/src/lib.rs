//! zonekv Common - Shared types and utilities
//!
//! This crate provides common types, error definitions, versioning and
//! configuration used across all zonekv components.

pub mod config;
pub mod error;
pub mod store_name;
pub mod types;
pub mod version;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use store_name::{SystemStoreName, SYSTEM_STORE_PREFIX};
pub use types::*;
pub use version::{Occurred, VectorClock, Versioned};
