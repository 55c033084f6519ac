//! Core type definitions for zonekv
//!
//! This module defines the fundamental identifiers used throughout the
//! system and the bootstrap endpoint type consumed during discovery.

use crate::error::{Error, Result};
use derive_more::{From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a cluster node
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, From, Into,
)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a node ID from its numeric form
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the numeric form
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a zone (datacenter/rack grouping of nodes)
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, From, Into,
)]
#[serde(transparent)]
pub struct ZoneId(u32);

impl ZoneId {
    /// Create a zone ID from its numeric form
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the numeric form
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZoneId({})", self.0)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a partition of the key space
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, From, Into,
)]
#[serde(transparent)]
pub struct PartitionId(u32);

impl PartitionId {
    /// Create a partition ID from its numeric form
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the numeric form
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartitionId({})", self.0)
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A seed endpoint used only during topology discovery.
///
/// Supplied by the caller at factory construction, consumed immediately,
/// and not retained once topology resolution succeeds.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BootstrapUrl {
    /// Host name or address
    pub host: String,
    /// Socket port
    pub port: u16,
}

impl BootstrapUrl {
    /// Create a bootstrap URL from host and port
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a `tcp://host:port` endpoint. The scheme is optional.
    pub fn parse(url: &str) -> Result<Self> {
        let rest = url.strip_prefix("tcp://").unwrap_or(url);
        let (host, port) = rest
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidBootstrapUrl(url.to_string()))?;
        if host.is_empty() {
            return Err(Error::InvalidBootstrapUrl(url.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| Error::InvalidBootstrapUrl(url.to_string()))?;
        Ok(Self::new(host, port))
    }
}

impl FromStr for BootstrapUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for BootstrapUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BootstrapUrl(tcp://{}:{})", self.host, self.port)
    }
}

impl fmt::Display for BootstrapUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tcp://{}:{}", self.host, self.port)
    }
}
