//! Deterministic zone-aware node ranking.
//!
//! Routing decisions must be reproducible: given the same topology and
//! client zone, the ranking is always the same. The total order is
//!
//! 1. nodes in the client's own zone,
//! 2. zones in the client zone's proximity list, in document order,
//! 3. any remaining zones by numeric zone id,
//!
//! with node id as the final tie-break inside each zone. A client zone that
//! is absent from the topology (or not configured at all) falls back to the
//! zone-agnostic ordering: numeric zone id, then node id.

use crate::topology::{ClusterTopology, Node};
use zonekv_common::ZoneId;

/// The zone visitation order for a client in `client_zone`
#[must_use]
pub fn zone_order(topology: &ClusterTopology, client_zone: Option<ZoneId>) -> Vec<ZoneId> {
    let mut all: Vec<ZoneId> = topology.zones().iter().map(|z| z.id).collect();
    all.sort_unstable();

    let Some(home) = client_zone.and_then(|z| topology.get_zone(z)) else {
        return all;
    };

    let mut order = vec![home.id];
    for &peer in &home.proximity_list {
        if !order.contains(&peer) {
            order.push(peer);
        }
    }
    for zone in all {
        if !order.contains(&zone) {
            order.push(zone);
        }
    }
    order
}

/// Rank the topology's nodes for a client in `client_zone`
#[must_use]
pub fn ranked_nodes(topology: &ClusterTopology, client_zone: Option<ZoneId>) -> Vec<Node> {
    let order = zone_order(topology, client_zone);
    let rank = |zone: ZoneId| order.iter().position(|&z| z == zone).unwrap_or(order.len());

    let mut nodes = topology.nodes().to_vec();
    nodes.sort_by_key(|n| (rank(n.zone_id), n.id));
    nodes
}
