//! Seed resolver - topology discovery from bootstrap URLs.
//!
//! Discovery is a small state machine rather than nested loops:
//! `Idle` → `TryingSeed(i)` → `Succeeded` | `Exhausted`. Each seed is tried
//! in the caller-supplied order; a full failed pass sleeps per the backoff
//! policy before the next pass, up to the configured pass budget or the
//! overall deadline, whichever ends first.

use crate::accessor::StoreAccessor;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};
use zonekv_common::store_name::{CLUSTER_KEY, METADATA_STORE};
use zonekv_common::{BootstrapUrl, ClientConfig, Error, NodeId, Result, SystemStoreName, ZoneId};
use zonekv_topology::Node;

/// Discovery progress. One transient connection per attempt; connection
/// reuse belongs to the transport collaborator.
#[derive(Clone, Debug)]
pub enum BootstrapState {
    /// No seed tried yet
    Idle,
    /// Trying the seed at this index in the URL list
    TryingSeed(usize),
    /// A seed served the raw cluster document
    Succeeded(Bytes),
    /// Every seed failed in every pass
    Exhausted,
}

/// Resolves raw cluster metadata from an ordered seed list
pub struct SeedResolver {
    accessor: Arc<dyn StoreAccessor>,
    urls: Vec<BootstrapUrl>,
    max_passes: usize,
    backoff: Duration,
    request_timeout: Duration,
    deadline: Duration,
}

impl SeedResolver {
    /// Build a resolver from the client configuration
    #[must_use]
    pub fn from_config(accessor: Arc<dyn StoreAccessor>, config: &ClientConfig) -> Self {
        Self {
            accessor,
            urls: config.bootstrap_urls.clone(),
            max_passes: config.max_bootstrap_retries.max(1),
            backoff: config.bootstrap_backoff,
            request_timeout: config.request_timeout,
            deadline: config.operation_deadline,
        }
    }

    /// Fetch the raw cluster document from the first live seed.
    ///
    /// # Errors
    ///
    /// [`Error::BootstrapExhausted`] once every URL has failed in every
    /// pass, or the overall deadline has elapsed.
    pub async fn resolve(&self) -> Result<Bytes> {
        let deadline = Instant::now() + self.deadline;
        let store = SystemStoreName::new_unchecked(METADATA_STORE);
        let mut attempts = 0usize;
        let mut passes = 0usize;
        let mut state = BootstrapState::Idle;

        loop {
            state = match state {
                BootstrapState::Idle => {
                    if self.urls.is_empty() {
                        BootstrapState::Exhausted
                    } else {
                        BootstrapState::TryingSeed(0)
                    }
                }
                BootstrapState::TryingSeed(i) if i >= self.urls.len() => {
                    passes += 1;
                    if passes >= self.max_passes || Instant::now() + self.backoff >= deadline {
                        BootstrapState::Exhausted
                    } else {
                        debug!(pass = passes, "bootstrap pass failed, backing off");
                        sleep(self.backoff).await;
                        BootstrapState::TryingSeed(0)
                    }
                }
                BootstrapState::TryingSeed(i) => {
                    let url = &self.urls[i];
                    attempts += 1;
                    match self.try_seed(url, &store, deadline).await {
                        Ok(Some(raw)) => {
                            debug!(%url, "resolved cluster metadata");
                            BootstrapState::Succeeded(raw)
                        }
                        Ok(None) => {
                            warn!(%url, "seed holds no cluster metadata");
                            BootstrapState::TryingSeed(i + 1)
                        }
                        Err(e) => {
                            warn!(%url, error = %e, "seed attempt failed");
                            BootstrapState::TryingSeed(i + 1)
                        }
                    }
                }
                BootstrapState::Succeeded(raw) => return Ok(raw),
                BootstrapState::Exhausted => {
                    return Err(Error::BootstrapExhausted { attempts });
                }
            };
        }
    }

    async fn try_seed(
        &self,
        url: &BootstrapUrl,
        store: &SystemStoreName,
        deadline: Instant,
    ) -> Result<Option<Bytes>> {
        let now = Instant::now();
        if now >= deadline {
            return Err(Error::Timeout);
        }
        let budget = self.request_timeout.min(deadline - now);
        let seed = seed_node(url);
        match timeout(budget, self.accessor.get(&seed, store, CLUSTER_KEY)).await {
            Ok(result) => Ok(result?.map(|versioned| versioned.value)),
            Err(_) => Err(Error::Timeout),
        }
    }
}

/// A placeholder node addressing a seed endpoint. Only the socket endpoint
/// is meaningful; the topology is what we are about to discover.
fn seed_node(url: &BootstrapUrl) -> Node {
    Node {
        id: NodeId::new(0),
        host: url.host.clone(),
        socket_port: url.port,
        zone_id: ZoneId::new(0),
        partitions: Vec::new(),
    }
}
