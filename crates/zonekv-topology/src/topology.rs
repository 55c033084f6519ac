//! Cluster topology representation
//!
//! A [`ClusterTopology`] is built once from a resolved cluster document and
//! never mutated; re-bootstrap replaces the whole value.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use zonekv_common::{NodeId, PartitionId, ZoneId};

/// Immutable snapshot of the cluster: nodes, zones and the partition map
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterTopology {
    name: String,
    zones: Vec<Zone>,
    nodes: Vec<Node>,
}

impl ClusterTopology {
    /// Build a validated topology.
    ///
    /// When no zones are declared, one zone per distinct node zone id is
    /// implied, with empty proximity lists.
    ///
    /// # Errors
    ///
    /// Rejects empty clusters, duplicate node or zone ids, references to
    /// undeclared zones, duplicate partition ownership and gaps in the
    /// partition range.
    pub fn new(
        name: impl Into<String>,
        mut zones: Vec<Zone>,
        nodes: Vec<Node>,
    ) -> Result<Self, TopologyError> {
        if nodes.is_empty() {
            return Err(TopologyError::EmptyCluster);
        }

        if zones.is_empty() {
            let mut implied: Vec<ZoneId> = nodes.iter().map(|n| n.zone_id).collect();
            implied.sort_unstable();
            implied.dedup();
            zones = implied.into_iter().map(Zone::standalone).collect();
        }

        let mut zone_ids = HashSet::new();
        for zone in &zones {
            if !zone_ids.insert(zone.id) {
                return Err(TopologyError::DuplicateZoneId(zone.id));
            }
        }
        for zone in &zones {
            for &peer in &zone.proximity_list {
                if !zone_ids.contains(&peer) {
                    return Err(TopologyError::UnknownProximityZone {
                        zone: zone.id,
                        referenced: peer,
                    });
                }
            }
        }

        let mut node_ids = HashSet::new();
        let mut owned = HashSet::new();
        let mut max_partition = 0u32;
        for node in &nodes {
            if !node_ids.insert(node.id) {
                return Err(TopologyError::DuplicateNodeId(node.id));
            }
            if !zone_ids.contains(&node.zone_id) {
                return Err(TopologyError::UnknownZone {
                    node: node.id,
                    zone: node.zone_id,
                });
            }
            for &partition in &node.partitions {
                if !owned.insert(partition) {
                    return Err(TopologyError::DuplicatePartition {
                        partition,
                        node: node.id,
                    });
                }
                max_partition = max_partition.max(partition.as_u32());
            }
        }

        if owned.is_empty() {
            return Err(TopologyError::NoPartitions);
        }
        for id in 0..=max_partition {
            let partition = PartitionId::new(id);
            if !owned.contains(&partition) {
                return Err(TopologyError::UnassignedPartition(partition));
            }
        }

        Ok(Self {
            name: name.into(),
            zones,
            nodes,
        })
    }

    /// Cluster name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All nodes, in document order
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All zones, in document order
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Look up a node by id
    #[must_use]
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up a zone by id
    #[must_use]
    pub fn get_zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Whether a zone id exists in this topology
    #[must_use]
    pub fn has_zone(&self, id: ZoneId) -> bool {
        self.get_zone(id).is_some()
    }

    /// Total number of partitions in the cluster
    #[must_use]
    pub fn num_partitions(&self) -> usize {
        self.nodes.iter().map(|n| n.partitions.len()).sum()
    }
}

/// A single cluster node
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node id
    pub id: NodeId,
    /// Host name or address
    pub host: String,
    /// Socket endpoint port
    pub socket_port: u16,
    /// Zone this node lives in
    pub zone_id: ZoneId,
    /// Partitions owned by this node
    pub partitions: Vec<PartitionId>,
}

impl Node {
    /// The node's socket endpoint as `host:port`
    #[must_use]
    pub fn socket_endpoint(&self) -> String {
        format!("{}:{}", self.host, self.socket_port)
    }
}

/// A zone plus its proximity ordering to other zones, nearest first
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone id
    pub id: ZoneId,
    /// Other zones ordered from nearest to farthest
    pub proximity_list: Vec<ZoneId>,
}

impl Zone {
    /// Create a zone with an explicit proximity list
    #[must_use]
    pub const fn new(id: ZoneId, proximity_list: Vec<ZoneId>) -> Self {
        Self { id, proximity_list }
    }

    /// Create a zone with no declared neighbors
    #[must_use]
    pub const fn standalone(id: ZoneId) -> Self {
        Self {
            id,
            proximity_list: Vec::new(),
        }
    }
}

/// Validation errors for a cluster topology
#[derive(Debug, Clone, thiserror::Error)]
pub enum TopologyError {
    #[error("cluster has no nodes")]
    EmptyCluster,
    #[error("cluster has no partitions")]
    NoPartitions,
    #[error("duplicate node id {0}")]
    DuplicateNodeId(NodeId),
    #[error("duplicate zone id {0}")]
    DuplicateZoneId(ZoneId),
    #[error("node {node} references undeclared zone {zone}")]
    UnknownZone { node: NodeId, zone: ZoneId },
    #[error("zone {zone} proximity list references undeclared zone {referenced}")]
    UnknownProximityZone { zone: ZoneId, referenced: ZoneId },
    #[error("partition {partition} claimed by more than one node (node {node})")]
    DuplicatePartition {
        partition: PartitionId,
        node: NodeId,
    },
    #[error("partition {0} is not assigned to any node")]
    UnassignedPartition(PartitionId),
}

impl From<TopologyError> for zonekv_common::Error {
    fn from(err: TopologyError) -> Self {
        Self::Parse(err.to_string())
    }
}
