//! Metadata store accessor - the collaborator seam to the storage engine.
//!
//! One call is one attempt against one node. Retry and failover live in the
//! [`SystemStoreClient`](crate::store::SystemStoreClient); the accessor
//! only distinguishes transport failure ([`Error::Unreachable`]) from a
//! stale write ([`Error::VersionConflict`]).

use async_trait::async_trait;
use bytes::Bytes;
use zonekv_common::{Result, SystemStoreName, VectorClock, Versioned};
use zonekv_topology::Node;

/// Single-attempt, single-node access to a named store.
///
/// Implementations must be `Send + Sync`; clients share one accessor across
/// many store handles.
#[async_trait]
pub trait StoreAccessor: Send + Sync {
    /// Fetch the versioned value under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// [`Error::Unreachable`](zonekv_common::Error::Unreachable) on
    /// transport failure.
    async fn get(
        &self,
        node: &Node,
        store: &SystemStoreName,
        key: &str,
    ) -> Result<Option<Versioned<Bytes>>>;

    /// Write `value` under `key`, guarded by the version observed at the
    /// most recent read. Returns the value's new version.
    ///
    /// # Errors
    ///
    /// [`Error::VersionConflict`](zonekv_common::Error::VersionConflict)
    /// when `expected` no longer matches the store's current version;
    /// [`Error::Unreachable`](zonekv_common::Error::Unreachable) on
    /// transport failure.
    async fn put(
        &self,
        node: &Node,
        store: &SystemStoreName,
        key: &str,
        value: Bytes,
        expected: VectorClock,
    ) -> Result<VectorClock>;

    /// Remove `key`, guarded the same way as [`put`](Self::put).
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](zonekv_common::Error::NotFound) if the key is
    /// absent, plus the same conflict/transport errors as `put`.
    async fn delete(
        &self,
        node: &Node,
        store: &SystemStoreName,
        key: &str,
        expected: VectorClock,
    ) -> Result<()>;
}
