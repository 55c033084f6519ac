//! zonekv Topology - Cluster topology model and zone-aware routing
//!
//! This crate parses the cluster document fetched during bootstrap into an
//! immutable [`ClusterTopology`] and derives deterministic zone-ranked node
//! orderings from it.

pub mod routing;
pub mod topology;
pub mod xml;

pub use routing::{ranked_nodes, zone_order};
pub use topology::{ClusterTopology, Node, TopologyError, Zone};
