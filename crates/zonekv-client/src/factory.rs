//! System store client factory.
//!
//! Orchestrates the bootstrap pipeline: namespace guard → topology (from a
//! caller-supplied override or the seed resolver) → zone-ranked routing →
//! a typed client bound to the store. Each failure mode is terminal for
//! the call; the caller retries the whole `create_system_store`, never a
//! sub-step.

use crate::accessor::StoreAccessor;
use crate::bootstrap::SeedResolver;
use crate::store::SystemStoreClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info};
use zonekv_common::{ClientConfig, Error, Result, SystemStoreName, ZoneId};
use zonekv_topology::{ranked_nodes, ClusterTopology};

/// Produces [`SystemStoreClient`] instances from a shared configuration
/// and accessor
pub struct SystemStoreClientFactory {
    config: ClientConfig,
    accessor: Arc<dyn StoreAccessor>,
}

impl SystemStoreClientFactory {
    /// Create a factory over the given transport collaborator
    #[must_use]
    pub fn new(config: ClientConfig, accessor: Arc<dyn StoreAccessor>) -> Self {
        Self { config, accessor }
    }

    /// The factory's configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Discover and parse the live cluster topology from the configured
    /// seed list.
    ///
    /// # Errors
    ///
    /// [`Error::BootstrapExhausted`] when no seed answers;
    /// [`Error::Parse`] when a seed serves a malformed document.
    pub async fn bootstrap_topology(&self) -> Result<ClusterTopology> {
        let resolver = SeedResolver::from_config(self.accessor.clone(), &self.config);
        let raw = resolver.resolve().await?;
        let xml = std::str::from_utf8(&raw)
            .map_err(|e| Error::Parse(format!("cluster document is not UTF-8: {e}")))?;
        ClusterTopology::from_xml(xml)
    }

    /// Create a typed client for the system store `name`.
    ///
    /// A supplied `cluster_xml` bypasses discovery; a supplied
    /// `zone_override` takes precedence over the configured client zone.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalStoreName`] for names outside the reserved
    /// namespace (checked before any network call);
    /// [`Error::BootstrapExhausted`] and [`Error::Parse`] per
    /// [`bootstrap_topology`](Self::bootstrap_topology).
    pub async fn create_system_store<K, V>(
        &self,
        name: &str,
        cluster_xml: Option<&str>,
        zone_override: Option<ZoneId>,
    ) -> Result<SystemStoreClient<K, V>>
    where
        K: Display,
        V: Serialize + DeserializeOwned,
    {
        // Namespace guard first; an invalid name must never reach the network
        let store_name = SystemStoreName::new(name)?;

        let topology = match cluster_xml {
            Some(xml) => ClusterTopology::from_xml(xml)?,
            None => self.bootstrap_topology().await?,
        };

        let zone = zone_override.or(self.config.client_zone_id);
        if let Some(z) = zone
            && !topology.has_zone(z)
        {
            debug!(zone = %z, "configured zone absent from topology, routing zone-agnostically");
        }
        let ranked = ranked_nodes(&topology, zone);

        info!(
            store = %store_name,
            nodes = ranked.len(),
            zones = topology.zones().len(),
            "system store client created"
        );
        Ok(SystemStoreClient::new(
            store_name,
            ranked,
            self.accessor.clone(),
            &self.config,
        ))
    }
}
