//! Cluster document codec.
//!
//! The cluster topology travels as an XML document under the well-known
//! `cluster.xml` metadata key:
//!
//! ```xml
//! <cluster>
//!   <name>prod</name>
//!   <zone>
//!     <zone-id>0</zone-id>
//!     <proximity-list>1</proximity-list>
//!   </zone>
//!   <server>
//!     <id>0</id>
//!     <host>node0.example.com</host>
//!     <socket-port>6666</socket-port>
//!     <partitions>0, 1, 2</partitions>
//!     <zone-id>0</zone-id>
//!   </server>
//! </cluster>
//! ```
//!
//! Integer lists are comma separated. A missing `<zone-id>` on a server
//! means zone 0; a cluster with no `<zone>` elements implies one zone per
//! distinct server zone id.

use crate::topology::{ClusterTopology, Node, Zone};
use serde::{Deserialize, Serialize};
use zonekv_common::{Error, NodeId, PartitionId, Result, ZoneId};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "cluster")]
struct ClusterXml {
    name: String,
    #[serde(rename = "zone", default, skip_serializing_if = "Vec::is_empty")]
    zones: Vec<ZoneXml>,
    #[serde(rename = "server", default)]
    servers: Vec<ServerXml>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ZoneXml {
    #[serde(rename = "zone-id")]
    zone_id: u32,
    #[serde(rename = "proximity-list", default)]
    proximity_list: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ServerXml {
    id: u32,
    host: String,
    #[serde(rename = "socket-port")]
    socket_port: u16,
    partitions: String,
    #[serde(rename = "zone-id", default)]
    zone_id: u32,
}

impl ClusterTopology {
    /// Parse a cluster document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] on malformed XML, malformed integer lists
    /// or violated topology invariants.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let doc: ClusterXml =
            quick_xml::de::from_str(xml).map_err(|e| Error::Parse(e.to_string()))?;

        let zones = doc
            .zones
            .into_iter()
            .map(|z| {
                Ok(Zone::new(
                    ZoneId::new(z.zone_id),
                    parse_id_list(&z.proximity_list)?
                        .into_iter()
                        .map(ZoneId::new)
                        .collect(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let nodes = doc
            .servers
            .into_iter()
            .map(|s| {
                Ok(Node {
                    id: NodeId::new(s.id),
                    host: s.host,
                    socket_port: s.socket_port,
                    zone_id: ZoneId::new(s.zone_id),
                    partitions: parse_id_list(&s.partitions)?
                        .into_iter()
                        .map(PartitionId::new)
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(doc.name, zones, nodes)?)
    }

    /// Serialize back to a cluster document
    pub fn to_xml(&self) -> Result<String> {
        let doc = ClusterXml {
            name: self.name().to_string(),
            zones: self
                .zones()
                .iter()
                .map(|z| ZoneXml {
                    zone_id: z.id.as_u32(),
                    proximity_list: join_id_list(z.proximity_list.iter().map(|id| id.as_u32())),
                })
                .collect(),
            servers: self
                .nodes()
                .iter()
                .map(|n| ServerXml {
                    id: n.id.as_u32(),
                    host: n.host.clone(),
                    socket_port: n.socket_port,
                    partitions: join_id_list(n.partitions.iter().map(|id| id.as_u32())),
                    zone_id: n.zone_id.as_u32(),
                })
                .collect(),
        };
        quick_xml::se::to_string(&doc).map_err(|e| Error::Serialization(e.to_string()))
    }
}

fn parse_id_list(raw: &str) -> Result<Vec<u32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| Error::Parse(format!("malformed integer list entry: {s:?}")))
        })
        .collect()
}

fn join_id_list(ids: impl Iterator<Item = u32>) -> String {
    ids.map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}
