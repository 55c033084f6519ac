//! In-memory cluster accessor.
//!
//! Models a fully replicated cluster in one process: a single logical
//! store map shared by every node, with per-endpoint reachability and
//! attempt counters. Serves as the embedded [`StoreAccessor`]
//! implementation and as the fixture behind the integration tests (downed
//! nodes drive the failover paths; attempt counters prove which endpoints
//! were contacted).

use crate::accessor::StoreAccessor;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use zonekv_common::store_name::{CLUSTER_KEY, METADATA_STORE};
use zonekv_common::{
    Error, NodeId, Occurred, Result, SystemStoreName, VectorClock, Versioned,
};
use zonekv_topology::{ClusterTopology, Node};

#[derive(Clone)]
pub struct InMemoryCluster {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    endpoints: HashMap<String, EndpointState>,
    stores: HashMap<String, HashMap<String, Versioned<Bytes>>>,
    total_attempts: usize,
}

struct EndpointState {
    node_id: NodeId,
    reachable: bool,
    attempts: usize,
}

impl InMemoryCluster {
    /// Stand up an in-memory cluster for `topology`, with the serialized
    /// topology pre-published under the well-known cluster key so that
    /// bootstrap against any endpoint succeeds.
    pub fn new(topology: &ClusterTopology) -> Result<Self> {
        let mut endpoints = HashMap::new();
        for node in topology.nodes() {
            endpoints.insert(
                node.socket_endpoint(),
                EndpointState {
                    node_id: node.id,
                    reachable: true,
                    attempts: 0,
                },
            );
        }

        let mut stores: HashMap<String, HashMap<String, Versioned<Bytes>>> = HashMap::new();
        stores.entry(METADATA_STORE.to_string()).or_default().insert(
            CLUSTER_KEY.to_string(),
            Versioned::new(Bytes::from(topology.to_xml()?), VectorClock::new()),
        );

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                endpoints,
                stores,
                total_attempts: 0,
            })),
        })
    }

    /// Mark an endpoint reachable or unreachable
    pub fn set_reachable(&self, endpoint: &str, reachable: bool) {
        if let Some(state) = self.inner.lock().endpoints.get_mut(endpoint) {
            state.reachable = reachable;
        }
    }

    /// Attempts observed at one endpoint
    #[must_use]
    pub fn attempts(&self, endpoint: &str) -> usize {
        self.inner
            .lock()
            .endpoints
            .get(endpoint)
            .map_or(0, |s| s.attempts)
    }

    /// Attempts observed across the whole cluster, known endpoints or not
    #[must_use]
    pub fn total_attempts(&self) -> usize {
        self.inner.lock().total_attempts
    }
}

impl Inner {
    /// Count the attempt, then resolve the endpoint to its node id.
    fn admit(&mut self, endpoint: &str) -> Result<NodeId> {
        self.total_attempts += 1;
        match self.endpoints.get_mut(endpoint) {
            Some(state) => {
                state.attempts += 1;
                if state.reachable {
                    Ok(state.node_id)
                } else {
                    Err(Error::unreachable(endpoint, "node is down"))
                }
            }
            None => Err(Error::unreachable(endpoint, "connection refused")),
        }
    }
}

#[async_trait]
impl StoreAccessor for InMemoryCluster {
    async fn get(
        &self,
        node: &Node,
        store: &SystemStoreName,
        key: &str,
    ) -> Result<Option<Versioned<Bytes>>> {
        let mut inner = self.inner.lock();
        inner.admit(&node.socket_endpoint())?;
        Ok(inner
            .stores
            .get(store.as_str())
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn put(
        &self,
        node: &Node,
        store: &SystemStoreName,
        key: &str,
        value: Bytes,
        expected: VectorClock,
    ) -> Result<VectorClock> {
        let mut inner = self.inner.lock();
        let node_id = inner.admit(&node.socket_endpoint())?;
        let entries = inner.stores.entry(store.as_str().to_string()).or_default();

        if let Some(current) = entries.get(key) {
            match expected.compare(&current.version) {
                Occurred::Equal | Occurred::After => {}
                Occurred::Before | Occurred::Concurrent => {
                    return Err(Error::VersionConflict {
                        key: key.to_string(),
                    });
                }
            }
        }

        let version = expected.incremented(node_id);
        entries.insert(key.to_string(), Versioned::new(value, version.clone()));
        Ok(version)
    }

    async fn delete(
        &self,
        node: &Node,
        store: &SystemStoreName,
        key: &str,
        expected: VectorClock,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.admit(&node.socket_endpoint())?;
        let entries = inner.stores.entry(store.as_str().to_string()).or_default();

        let Some(current) = entries.get(key) else {
            return Err(Error::NotFound {
                store: store.as_str().to_string(),
                key: key.to_string(),
            });
        };
        match expected.compare(&current.version) {
            Occurred::Equal | Occurred::After => {
                entries.remove(key);
                Ok(())
            }
            Occurred::Before | Occurred::Concurrent => Err(Error::VersionConflict {
                key: key.to_string(),
            }),
        }
    }
}
