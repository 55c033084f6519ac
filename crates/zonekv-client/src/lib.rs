//! zonekv Client - Bootstrap protocol and system store access
//!
//! This crate implements the client side of the metadata-distribution
//! layer: discovering cluster topology from seed URLs, routing by zone, and
//! reading/writing the reserved system stores with versioned values.
//!
//! The wire transport is an external collaborator behind the
//! [`StoreAccessor`] trait; [`InMemoryCluster`] is the embedded
//! implementation used by tests and single-process deployments.

pub mod accessor;
pub mod bootstrap;
pub mod factory;
pub mod memory;
pub mod store;

pub use accessor::StoreAccessor;
pub use bootstrap::{BootstrapState, SeedResolver};
pub use factory::SystemStoreClientFactory;
pub use memory::InMemoryCluster;
pub use store::SystemStoreClient;
