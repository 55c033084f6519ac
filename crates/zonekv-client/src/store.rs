//! System store client - the per-store façade.
//!
//! A client is bound to one store name and one topology snapshot. Reads
//! and writes walk the zone-ranked node order strictly sequentially; a
//! transport failure advances to the next ranked node, anything else is
//! surfaced as-is. Writes are guarded by the version observed at the most
//! recent read; a conflict is never retried here because blind retry risks
//! overwriting a concurrent legitimate metadata update.

use crate::accessor::StoreAccessor;
use bytes::Bytes;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::warn;
use zonekv_common::{ClientConfig, Error, Result, SystemStoreName, VectorClock, Versioned};
use zonekv_topology::Node;

/// Typed client for one system store.
///
/// Keys are rendered through `Display`; values travel as JSON. The only
/// mutable state is an advisory per-key version cache - best effort, never
/// authoritative.
pub struct SystemStoreClient<K, V> {
    name: SystemStoreName,
    ranked: Vec<Node>,
    accessor: Arc<dyn StoreAccessor>,
    max_attempts: usize,
    request_timeout: Duration,
    operation_deadline: Duration,
    version_cache: Mutex<HashMap<String, VectorClock>>,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V> std::fmt::Debug for SystemStoreClient<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemStoreClient")
            .field("name", &self.name)
            .field("ranked", &self.ranked)
            .field("max_attempts", &self.max_attempts)
            .field("request_timeout", &self.request_timeout)
            .field("operation_deadline", &self.operation_deadline)
            .finish_non_exhaustive()
    }
}

impl<K, V> SystemStoreClient<K, V>
where
    K: Display,
    V: Serialize + DeserializeOwned,
{
    /// Bind a client to a store name and a zone-ranked node ordering
    #[must_use]
    pub fn new(
        name: SystemStoreName,
        ranked: Vec<Node>,
        accessor: Arc<dyn StoreAccessor>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            name,
            ranked,
            accessor,
            max_attempts: config.max_store_attempts,
            request_timeout: config.request_timeout,
            operation_deadline: config.operation_deadline,
            version_cache: Mutex::new(HashMap::new()),
            _marker: PhantomData,
        }
    }

    /// The bound store name
    #[must_use]
    pub fn store_name(&self) -> &SystemStoreName {
        &self.name
    }

    /// The node ordering this client routes through
    #[must_use]
    pub fn ranked_nodes(&self) -> &[Node] {
        &self.ranked
    }

    /// Read the value under `key`, with its version
    pub async fn get_versioned(&self, key: &K) -> Result<Option<Versioned<V>>> {
        let key = key.to_string();
        match self.fetch(&key).await? {
            Some(versioned) => {
                self.version_cache
                    .lock()
                    .insert(key, versioned.version.clone());
                let value = serde_json::from_slice(&versioned.value)
                    .map_err(|e| Error::Deserialization(e.to_string()))?;
                Ok(Some(Versioned::new(value, versioned.version)))
            }
            None => {
                self.version_cache.lock().remove(&key);
                Ok(None)
            }
        }
    }

    /// Read the value under `key`
    pub async fn get_value(&self, key: &K) -> Result<Option<V>> {
        Ok(self.get_versioned(key).await?.map(|v| v.value))
    }

    /// Write `value` under `key`.
    ///
    /// The expected version comes from the advisory cache, or from a fresh
    /// read when the cache holds nothing for this key.
    ///
    /// # Errors
    ///
    /// [`Error::VersionConflict`] when a concurrent writer got there first;
    /// [`Error::StoreUnavailable`] when every ranked node failed.
    pub async fn put_value(&self, key: &K, value: &V) -> Result<()> {
        let key = key.to_string();
        let bytes = Bytes::from(
            serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?,
        );
        let expected = self.current_version(&key).await?;

        let deadline = Instant::now() + self.operation_deadline;
        let mut attempts = 0;
        for node in self.ranked.iter().take(self.attempt_cap()) {
            let Some(budget) = remaining_budget(deadline, self.request_timeout) else {
                break;
            };
            attempts += 1;
            let put = self
                .accessor
                .put(node, &self.name, &key, bytes.clone(), expected.clone());
            match timeout(budget, put).await {
                Ok(Ok(version)) => {
                    self.version_cache.lock().insert(key, version);
                    return Ok(());
                }
                Ok(Err(e @ Error::VersionConflict { .. })) => {
                    // The cached version is provably stale
                    self.version_cache.lock().remove(&key);
                    return Err(e);
                }
                Ok(Err(e)) if is_failover(&e) => {
                    warn!(store = %self.name, node = %node.id, error = %e, "put failed over");
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    warn!(store = %self.name, node = %node.id, "put attempt timed out");
                }
            }
        }
        Err(Error::StoreUnavailable {
            store: self.name.to_string(),
            attempts,
        })
    }

    /// Remove `key`, guarded by its last observed version.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the key is absent, plus the same failure
    /// surface as [`put_value`](Self::put_value).
    pub async fn delete_value(&self, key: &K) -> Result<()> {
        let key = key.to_string();
        let expected = self.current_version(&key).await?;

        let deadline = Instant::now() + self.operation_deadline;
        let mut attempts = 0;
        for node in self.ranked.iter().take(self.attempt_cap()) {
            let Some(budget) = remaining_budget(deadline, self.request_timeout) else {
                break;
            };
            attempts += 1;
            let delete = self
                .accessor
                .delete(node, &self.name, &key, expected.clone());
            match timeout(budget, delete).await {
                Ok(Ok(())) => {
                    self.version_cache.lock().remove(&key);
                    return Ok(());
                }
                Ok(Err(e @ Error::VersionConflict { .. })) => {
                    self.version_cache.lock().remove(&key);
                    return Err(e);
                }
                Ok(Err(e)) if is_failover(&e) => {
                    warn!(store = %self.name, node = %node.id, error = %e, "delete failed over");
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    warn!(store = %self.name, node = %node.id, "delete attempt timed out");
                }
            }
        }
        Err(Error::StoreUnavailable {
            store: self.name.to_string(),
            attempts,
        })
    }

    /// Raw read with ranked failover
    async fn fetch(&self, key: &str) -> Result<Option<Versioned<Bytes>>> {
        let deadline = Instant::now() + self.operation_deadline;
        let mut attempts = 0;
        for node in self.ranked.iter().take(self.attempt_cap()) {
            let Some(budget) = remaining_budget(deadline, self.request_timeout) else {
                break;
            };
            attempts += 1;
            match timeout(budget, self.accessor.get(node, &self.name, key)).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if is_failover(&e) => {
                    warn!(store = %self.name, node = %node.id, error = %e, "get failed over");
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    warn!(store = %self.name, node = %node.id, "get attempt timed out");
                }
            }
        }
        Err(Error::StoreUnavailable {
            store: self.name.to_string(),
            attempts,
        })
    }

    /// Cached version for `key`, or the version observed by a fresh read;
    /// an absent key yields the empty clock.
    async fn current_version(&self, key: &str) -> Result<VectorClock> {
        if let Some(cached) = self.version_cache.lock().get(key).cloned() {
            return Ok(cached);
        }
        Ok(self
            .fetch(key)
            .await?
            .map_or_else(VectorClock::new, |versioned| versioned.version))
    }

    fn attempt_cap(&self) -> usize {
        self.max_attempts.min(self.ranked.len())
    }
}

/// Transport-level failures move on to the next ranked node; everything
/// else is the caller's to see.
fn is_failover(e: &Error) -> bool {
    matches!(e, Error::Unreachable { .. } | Error::Timeout)
}

fn remaining_budget(deadline: Instant, request_timeout: Duration) -> Option<Duration> {
    let now = Instant::now();
    if now >= deadline {
        return None;
    }
    Some(request_timeout.min(deadline - now))
}
