//! System store names and the reserved-namespace guard.
//!
//! Store names under the `voldsys$_` prefix address cluster control
//! metadata rather than application data. Construction of a
//! [`SystemStoreName`] is the namespace guard: it runs before any network
//! call and is the isolation boundary that keeps application code from
//! reading or corrupting control metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved prefix for system store names. Fixed literal; external tooling
/// depends on names being accepted or rejected against it consistently.
pub const SYSTEM_STORE_PREFIX: &str = "voldsys$_";

/// System store holding schema/version markers for cluster metadata
pub const METADATA_VERSION_STORE: &str = "voldsys$_metadata_version_persistence";

/// System store holding client registration records
pub const CLIENT_REGISTRY_STORE: &str = "voldsys$_client_registry";

/// System store holding the store-definitions registry
pub const STORE_REGISTRY_STORE: &str = "voldsys$_store_registry";

/// System store backing bootstrap fetches of cluster metadata
pub const METADATA_STORE: &str = "voldsys$_metadata";

/// Well-known key for the serialized cluster topology document
pub const CLUSTER_KEY: &str = "cluster.xml";

/// Well-known key for the serialized store definitions document
pub const STORES_KEY: &str = "stores.xml";

/// A validated name in the reserved system-store namespace
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SystemStoreName(String);

impl SystemStoreName {
    /// Create a system store name, enforcing the reserved prefix.
    ///
    /// # Errors
    ///
    /// Returns [`StoreNameError`] for empty names and names outside the
    /// reserved namespace. No network call is ever issued for a rejected
    /// name.
    pub fn new(name: impl Into<String>) -> Result<Self, StoreNameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Create without validation (internal use only)
    #[must_use]
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the store name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<(), StoreNameError> {
        if name.is_empty() {
            return Err(StoreNameError::Empty);
        }
        if !name.starts_with(SYSTEM_STORE_PREFIX) {
            return Err(StoreNameError::MissingPrefix(name.to_string()));
        }
        if name.len() == SYSTEM_STORE_PREFIX.len() {
            return Err(StoreNameError::PrefixOnly);
        }
        Ok(())
    }
}

impl fmt::Debug for SystemStoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SystemStoreName({:?})", self.0)
    }
}

impl fmt::Display for SystemStoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when creating a system store name
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreNameError {
    #[error("store name cannot be empty")]
    Empty,
    #[error("store name {0:?} lacks the reserved prefix {SYSTEM_STORE_PREFIX:?}")]
    MissingPrefix(String),
    #[error("store name is the bare reserved prefix")]
    PrefixOnly,
}
