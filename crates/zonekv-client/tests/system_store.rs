//! End-to-end tests for the bootstrap pipeline and system store access,
//! driven through the in-memory cluster.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::Instant;
use zonekv_client::{InMemoryCluster, StoreAccessor, SystemStoreClient, SystemStoreClientFactory};
use zonekv_common::store_name::{METADATA_VERSION_STORE, STORES_KEY};
use zonekv_common::{
    BootstrapUrl, ClientConfig, Error, NodeId, PartitionId, Result, SystemStoreName, VectorClock,
    Versioned, ZoneId,
};
use zonekv_topology::{ranked_nodes, ClusterTopology, Node, Zone};

/// An accessor whose every call outlives any sane deadline. Used to prove
/// that operations abort on the configured budgets instead of hanging.
struct StalledAccessor;

impl StalledAccessor {
    async fn stall() {
        tokio::time::sleep(Duration::from_secs(3600)).await;
    }
}

#[async_trait]
impl StoreAccessor for StalledAccessor {
    async fn get(
        &self,
        _node: &Node,
        _store: &SystemStoreName,
        _key: &str,
    ) -> Result<Option<Versioned<Bytes>>> {
        Self::stall().await;
        Ok(None)
    }

    async fn put(
        &self,
        _node: &Node,
        _store: &SystemStoreName,
        _key: &str,
        _value: Bytes,
        expected: VectorClock,
    ) -> Result<VectorClock> {
        Self::stall().await;
        Ok(expected)
    }

    async fn delete(
        &self,
        _node: &Node,
        _store: &SystemStoreName,
        _key: &str,
        _expected: VectorClock,
    ) -> Result<()> {
        Self::stall().await;
        Ok(())
    }
}

fn node(id: u32, zone: u32, partitions: &[u32]) -> Node {
    Node {
        id: NodeId::new(id),
        host: format!("node{id}"),
        socket_port: 6666,
        zone_id: ZoneId::new(zone),
        partitions: partitions.iter().map(|&p| PartitionId::new(p)).collect(),
    }
}

/// Three zones in a proximity ring, two nodes each
fn zzz_topology() -> ClusterTopology {
    ClusterTopology::new(
        "zzz",
        vec![
            Zone::new(ZoneId::new(0), vec![ZoneId::new(1), ZoneId::new(2)]),
            Zone::new(ZoneId::new(1), vec![ZoneId::new(2), ZoneId::new(0)]),
            Zone::new(ZoneId::new(2), vec![ZoneId::new(0), ZoneId::new(1)]),
        ],
        vec![
            node(0, 0, &[0]),
            node(1, 0, &[1]),
            node(2, 1, &[2]),
            node(3, 1, &[3]),
            node(4, 2, &[4]),
            node(5, 2, &[5]),
        ],
    )
    .unwrap()
}

/// Two zones (1 and 3) with non-contiguous node ids
fn z1z3_topology() -> ClusterTopology {
    ClusterTopology::new(
        "z1z3",
        vec![
            Zone::new(ZoneId::new(1), vec![ZoneId::new(3)]),
            Zone::new(ZoneId::new(3), vec![ZoneId::new(1)]),
        ],
        vec![
            node(3, 1, &[0]),
            node(4, 1, &[1]),
            node(9, 3, &[2]),
            node(10, 3, &[3]),
        ],
    )
    .unwrap()
}

fn config_for(topology: &ClusterTopology, zone: Option<u32>) -> ClientConfig {
    let seed = &topology.nodes()[0];
    let mut config = ClientConfig::new(vec![BootstrapUrl::new(seed.host.clone(), seed.socket_port)])
        .with_bootstrap_backoff(Duration::from_millis(1))
        .with_request_timeout(Duration::from_millis(200))
        .with_operation_deadline(Duration::from_secs(2))
        .with_max_store_attempts(6);
    if let Some(z) = zone {
        config = config.with_client_zone_id(ZoneId::new(z));
    }
    config
}

fn factory_for(
    cluster: &InMemoryCluster,
    topology: &ClusterTopology,
    zone: Option<u32>,
) -> SystemStoreClientFactory {
    SystemStoreClientFactory::new(config_for(topology, zone), Arc::new(cluster.clone()))
}

async fn version_store(
    factory: &SystemStoreClientFactory,
) -> SystemStoreClient<String, String> {
    factory
        .create_system_store(METADATA_VERSION_STORE, None, None)
        .await
        .expect("metadata version store is a legal system store")
}

#[tokio::test]
async fn test_basic_store_round_trip_per_zone() {
    for zone in [0, 1, 2] {
        let topology = zzz_topology();
        let cluster = InMemoryCluster::new(&topology).unwrap();
        let factory = factory_for(&cluster, &topology, Some(zone));

        let store = version_store(&factory).await;
        store
            .put_value(&STORES_KEY.to_string(), &"1".to_string())
            .await
            .unwrap();
        let fetched = store.get_value(&STORES_KEY.to_string()).await.unwrap();
        assert_eq!(fetched.as_deref(), Some("1"), "zone {zone}");
    }
}

#[tokio::test]
async fn test_custom_cluster_xml_bypasses_bootstrap() {
    let topology = zzz_topology();
    let cluster = InMemoryCluster::new(&topology).unwrap();
    let factory = factory_for(&cluster, &topology, Some(1));
    let xml = topology.to_xml().unwrap();

    let store: SystemStoreClient<String, String> = factory
        .create_system_store(METADATA_VERSION_STORE, Some(&xml), None)
        .await
        .unwrap();
    assert_eq!(cluster.total_attempts(), 0, "override must skip discovery");

    store
        .put_value(&STORES_KEY.to_string(), &"1".to_string())
        .await
        .unwrap();
    assert_eq!(
        store
            .get_value(&STORES_KEY.to_string())
            .await
            .unwrap()
            .as_deref(),
        Some("1")
    );
}

#[tokio::test]
async fn test_illegal_store_name_issues_no_network_calls() {
    let topology = zzz_topology();
    let cluster = InMemoryCluster::new(&topology).unwrap();
    let factory = factory_for(&cluster, &topology, Some(1));
    let xml = topology.to_xml().unwrap();

    let with_override = factory
        .create_system_store::<String, String>("test-store", Some(&xml), None)
        .await;
    assert!(matches!(with_override, Err(Error::IllegalStoreName(_))));

    // The guard also precedes bootstrap when no override is supplied
    let without_override = factory
        .create_system_store::<String, String>("test-store", None, None)
        .await;
    assert!(matches!(without_override, Err(Error::IllegalStoreName(_))));

    assert_eq!(cluster.total_attempts(), 0);
}

#[tokio::test]
async fn test_unknown_client_zone_falls_back_to_zone_agnostic() {
    let topology = z1z3_topology();
    let cluster = InMemoryCluster::new(&topology).unwrap();
    // Zone 5 does not exist in this two-zone cluster
    let factory = factory_for(&cluster, &topology, Some(5));

    let store = version_store(&factory).await;
    assert_eq!(store.ranked_nodes(), ranked_nodes(&topology, None).as_slice());

    store
        .put_value(&STORES_KEY.to_string(), &"1".to_string())
        .await
        .unwrap();
    assert_eq!(
        store
            .get_value(&STORES_KEY.to_string())
            .await
            .unwrap()
            .as_deref(),
        Some("1")
    );
}

#[tokio::test]
async fn test_zone_affinity_ranks_home_zone_first() {
    let topology = z1z3_topology();
    let cluster = InMemoryCluster::new(&topology).unwrap();
    let factory = factory_for(&cluster, &topology, Some(3));

    let store = version_store(&factory).await;
    let ranked = store.ranked_nodes();
    assert!(ranked[..2].iter().all(|n| n.zone_id == ZoneId::new(3)));
    assert!(ranked[2..].iter().all(|n| n.zone_id == ZoneId::new(1)));
}

#[tokio::test]
async fn test_failover_attempts_match_first_reachable_rank() {
    let topology = zzz_topology();
    let cluster = InMemoryCluster::new(&topology).unwrap();
    let factory = factory_for(&cluster, &topology, Some(0));

    let store = version_store(&factory).await;
    store
        .put_value(&STORES_KEY.to_string(), &"1".to_string())
        .await
        .unwrap();

    // Down the two top-ranked (zone 0) nodes; first reachable is rank 2
    let ranked = store.ranked_nodes().to_vec();
    cluster.set_reachable(&ranked[0].socket_endpoint(), false);
    cluster.set_reachable(&ranked[1].socket_endpoint(), false);

    let before = cluster.total_attempts();
    let fetched = store.get_value(&STORES_KEY.to_string()).await.unwrap();
    assert_eq!(fetched.as_deref(), Some("1"));
    assert_eq!(cluster.total_attempts() - before, 3);
    assert_eq!(cluster.attempts(&ranked[2].socket_endpoint()), 1);
}

#[tokio::test]
async fn test_all_nodes_down_yields_store_unavailable() {
    let topology = z1z3_topology();
    let cluster = InMemoryCluster::new(&topology).unwrap();
    let factory = factory_for(&cluster, &topology, Some(1));

    let store = version_store(&factory).await;
    for node in store.ranked_nodes().to_vec() {
        cluster.set_reachable(&node.socket_endpoint(), false);
    }
    let err = store.get_value(&STORES_KEY.to_string()).await.unwrap_err();
    assert!(matches!(err, Error::StoreUnavailable { .. }));
}

#[tokio::test]
async fn test_concurrent_writer_surfaces_version_conflict() {
    let topology = zzz_topology();
    let cluster = InMemoryCluster::new(&topology).unwrap();
    let factory = factory_for(&cluster, &topology, None);

    let writer_a = version_store(&factory).await;
    let writer_b = version_store(&factory).await;
    let key = STORES_KEY.to_string();

    writer_a.put_value(&key, &"1".to_string()).await.unwrap();
    // B reads A's version and advances past it
    writer_b.put_value(&key, &"2".to_string()).await.unwrap();

    // A still holds its own stale cached version
    let conflict = writer_a.put_value(&key, &"3".to_string()).await;
    assert!(matches!(conflict, Err(Error::VersionConflict { .. })));

    // The conflict dropped A's stale cache entry; a retry reads afresh
    writer_a.put_value(&key, &"3".to_string()).await.unwrap();
    assert_eq!(
        writer_b.get_value(&key).await.unwrap().as_deref(),
        Some("3")
    );
}

#[tokio::test]
async fn test_delete_value() {
    let topology = zzz_topology();
    let cluster = InMemoryCluster::new(&topology).unwrap();
    let factory = factory_for(&cluster, &topology, Some(2));

    let store = version_store(&factory).await;
    let key = STORES_KEY.to_string();
    store.put_value(&key, &"1".to_string()).await.unwrap();
    store.delete_value(&key).await.unwrap();
    assert!(store.get_value(&key).await.unwrap().is_none());

    let missing = store.delete_value(&key).await;
    assert!(matches!(missing, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn test_bootstrap_is_idempotent() {
    let topology = zzz_topology();
    let cluster = InMemoryCluster::new(&topology).unwrap();
    let factory = factory_for(&cluster, &topology, None);

    let first = factory.bootstrap_topology().await.unwrap();
    let second = factory.bootstrap_topology().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first, topology);
}

#[tokio::test]
async fn test_dead_seeds_exhaust_bootstrap() {
    let topology = zzz_topology();
    let cluster = InMemoryCluster::new(&topology).unwrap();
    let config = ClientConfig::new(vec![
        BootstrapUrl::new("dead0", 1),
        BootstrapUrl::new("dead1", 1),
    ])
    .with_bootstrap_backoff(Duration::from_millis(1))
    .with_operation_deadline(Duration::from_millis(500));
    let factory = SystemStoreClientFactory::new(config, Arc::new(cluster));

    let err = factory
        .create_system_store::<String, String>(METADATA_VERSION_STORE, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BootstrapExhausted { .. }));
}

#[tokio::test]
async fn test_stalled_nodes_abort_on_operation_deadline() {
    let topology = zzz_topology();
    let config = config_for(&topology, Some(0))
        .with_request_timeout(Duration::from_millis(100))
        .with_operation_deadline(Duration::from_millis(300));
    let factory = SystemStoreClientFactory::new(config, Arc::new(StalledAccessor));
    let xml = topology.to_xml().unwrap();

    let store: SystemStoreClient<String, String> = factory
        .create_system_store(METADATA_VERSION_STORE, Some(&xml), None)
        .await
        .unwrap();
    let key = STORES_KEY.to_string();

    let started = Instant::now();
    let read = store.get_value(&key).await;
    assert!(matches!(read, Err(Error::StoreUnavailable { .. })));
    assert!(started.elapsed() < Duration::from_secs(2));

    let started = Instant::now();
    let write = store.put_value(&key, &"1".to_string()).await;
    assert!(matches!(write, Err(Error::StoreUnavailable { .. })));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_stalled_seeds_exhaust_bootstrap_within_deadline() {
    let topology = zzz_topology();
    let config = config_for(&topology, None)
        .with_request_timeout(Duration::from_millis(50))
        .with_operation_deadline(Duration::from_millis(300))
        .with_bootstrap_backoff(Duration::from_millis(10));
    let factory = SystemStoreClientFactory::new(config, Arc::new(StalledAccessor));

    let started = Instant::now();
    let err = factory.bootstrap_topology().await.unwrap_err();
    assert!(matches!(err, Error::BootstrapExhausted { .. }));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_malformed_override_is_a_parse_error() {
    let topology = zzz_topology();
    let cluster = InMemoryCluster::new(&topology).unwrap();
    let factory = factory_for(&cluster, &topology, None);

    let err = factory
        .create_system_store::<String, String>(
            METADATA_VERSION_STORE,
            Some("<cluster><name>broken</name>"),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}
