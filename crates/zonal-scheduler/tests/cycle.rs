//! End-to-end scheduling cycles against the embedded cluster store.
//!
//! Each test loads a cluster snapshot into an in-memory `StateStore`, runs
//! pre-filter once, then filters every node concurrently.

use std::collections::BTreeMap;
use std::sync::Arc;

use zonal_core::{
    ClaimRef, NodeRecord, OwnerReference, PodRecord, SchedulerConfig, VolumePhase, VolumeRecord,
    WorkloadRecord,
};
use zonal_scheduler::{CycleState, PredicateStatus, ZonalDistribution, run_cycle};
use zonal_state::{ClusterSnapshot, StateStore};

const ZONE: &str = "failure-domain.beta.kubernetes.io/zone";
const POD_LABEL: &str = "statefulset.kubernetes.io/pod-name";

fn node(name: &str, zone: &str) -> NodeRecord {
    NodeRecord {
        name: name.to_string(),
        labels: BTreeMap::from([(ZONE.to_string(), zone.to_string())]),
    }
}

fn crdb() -> WorkloadRecord {
    WorkloadRecord {
        namespace: "default".to_string(),
        name: "cockroachdb".to_string(),
        kind: "StatefulSet".to_string(),
        replicas: 6,
        volume_claim_templates: vec!["datadir".to_string()],
    }
}

fn pod(ordinal: u32) -> PodRecord {
    let name = format!("cockroachdb-{ordinal}");
    PodRecord {
        namespace: "default".to_string(),
        name: name.clone(),
        labels: BTreeMap::from([(POD_LABEL.to_string(), name)]),
        owner_references: vec![OwnerReference {
            kind: "StatefulSet".to_string(),
            name: "cockroachdb".to_string(),
        }],
    }
}

fn volume(ordinal: u32, zone: Option<&str>) -> VolumeRecord {
    VolumeRecord {
        name: format!("pvc-{ordinal:04}"),
        labels: zone
            .map(|z| BTreeMap::from([(ZONE.to_string(), z.to_string())]))
            .unwrap_or_default(),
        claim_ref: Some(ClaimRef {
            namespace: "default".to_string(),
            name: format!("datadir-cockroachdb-{ordinal}"),
        }),
        phase: VolumePhase::Bound,
    }
}

fn three_zones() -> Vec<NodeRecord> {
    vec![
        node("a-1", "us-east1-a"),
        node("a-2", "us-east1-a"),
        node("b-1", "us-east1-b"),
        node("b-2", "us-east1-b"),
        node("c-1", "us-east1-c"),
        node("c-2", "us-east1-c"),
    ]
}

fn plugin_for(snapshot: ClusterSnapshot, config: SchedulerConfig) -> Arc<ZonalDistribution<StateStore>> {
    let store = StateStore::open_in_memory().unwrap();
    store.import_snapshot(&snapshot).unwrap();
    Arc::new(ZonalDistribution::new(Arc::new(store), config))
}

fn feasible(outcome: &zonal_scheduler::CycleOutcome) -> Vec<String> {
    outcome.feasible_nodes().into_iter().map(String::from).collect()
}

#[tokio::test]
async fn fresh_cluster_spreads_ordinals_round_robin() {
    let plugin = plugin_for(
        ClusterSnapshot {
            nodes: three_zones(),
            workloads: vec![crdb()],
            ..Default::default()
        },
        SchedulerConfig::default(),
    );

    let expected = [
        ["a-1", "a-2"],
        ["b-1", "b-2"],
        ["c-1", "c-2"],
        ["a-1", "a-2"],
        ["b-1", "b-2"],
        ["c-1", "c-2"],
    ];
    for (ordinal, nodes) in expected.iter().enumerate() {
        let outcome = run_cycle(Arc::clone(&plugin), pod(ordinal as u32)).await.unwrap();
        assert_eq!(outcome.pre_filter, PredicateStatus::Success);
        assert_eq!(outcome.nodes.len(), 6);
        assert_eq!(feasible(&outcome), nodes.to_vec(), "ordinal {ordinal}");
    }
}

#[tokio::test]
async fn rejection_names_the_ideal_zone() {
    let plugin = plugin_for(
        ClusterSnapshot {
            nodes: three_zones(),
            workloads: vec![crdb()],
            ..Default::default()
        },
        SchedulerConfig::default(),
    );

    let outcome = run_cycle(plugin, pod(2)).await.unwrap();
    assert_eq!(
        outcome.nodes["a-1"],
        PredicateStatus::unschedulable("not in ideal zone us-east1-c")
    );
}

#[tokio::test]
async fn existing_volumes_reorder_topology() {
    // Ordinal 0's disk lives in zone c, so c takes slot 0.
    let plugin = plugin_for(
        ClusterSnapshot {
            nodes: three_zones(),
            workloads: vec![crdb()],
            volumes: vec![volume(0, Some("us-east1-c"))],
            ..Default::default()
        },
        SchedulerConfig::default(),
    );

    let outcome = run_cycle(Arc::clone(&plugin), pod(0)).await.unwrap();
    assert_eq!(feasible(&outcome), vec!["c-1", "c-2"]);

    let outcome = run_cycle(Arc::clone(&plugin), pod(2)).await.unwrap();
    assert_eq!(feasible(&outcome), vec!["a-1", "a-2"]);
}

#[tokio::test]
async fn replica_follows_its_volume_out_of_ideal_zone() {
    // Ordinals 0..=2 anchor zones a, b, c; ordinal 3's disk ended up in b.
    let plugin = plugin_for(
        ClusterSnapshot {
            nodes: three_zones(),
            workloads: vec![crdb()],
            volumes: vec![
                volume(0, Some("us-east1-a")),
                volume(1, Some("us-east1-b")),
                volume(2, Some("us-east1-c")),
                volume(3, Some("us-east1-b")),
            ],
            ..Default::default()
        },
        SchedulerConfig::default(),
    );

    let outcome = run_cycle(plugin, pod(3)).await.unwrap();
    assert_eq!(feasible(&outcome), vec!["a-1", "a-2", "b-1", "b-2"]);
    assert_eq!(
        outcome.nodes["c-1"],
        PredicateStatus::unschedulable("not in ideal zone us-east1-a")
    );
}

#[tokio::test]
async fn pre_filter_failure_evaluates_no_nodes() {
    let plugin = plugin_for(
        ClusterSnapshot {
            nodes: three_zones(),
            workloads: vec![crdb()],
            volumes: vec![volume(0, Some("us-east1-a")), volume(1, None)],
            ..Default::default()
        },
        SchedulerConfig::default(),
    );

    let outcome = run_cycle(plugin, pod(0)).await.unwrap();
    assert!(matches!(outcome.pre_filter, PredicateStatus::Error(_)));
    assert!(outcome.nodes.is_empty());
    assert!(outcome.feasible_nodes().is_empty());
}

#[tokio::test]
async fn pods_without_statefulset_label_go_anywhere() {
    let plugin = plugin_for(
        ClusterSnapshot {
            nodes: three_zones(),
            workloads: vec![crdb()],
            ..Default::default()
        },
        SchedulerConfig::default(),
    );

    let mut unlabeled = pod(1);
    unlabeled.labels.clear();
    let outcome = run_cycle(plugin, unlabeled).await.unwrap();
    assert_eq!(outcome.feasible_nodes().len(), 6);
}

#[tokio::test]
async fn small_pages_see_every_volume() {
    let mut volumes: Vec<VolumeRecord> = (0..7)
        .map(|ordinal| volume(ordinal, Some("us-east1-a")))
        .collect();
    volumes.push(volume(8, Some("us-east1-c")));

    let config = SchedulerConfig {
        page_size: 3,
        ..SchedulerConfig::default()
    };
    let plugin = plugin_for(
        ClusterSnapshot {
            nodes: three_zones(),
            workloads: vec![crdb()],
            volumes,
            ..Default::default()
        },
        config,
    );

    let state = CycleState::new();
    assert!(plugin.pre_filter(&state, &pod(8)).await.is_success());
    let affinity = state.volume_affinity().await.unwrap();
    assert_eq!(affinity.len(), 8);
    assert!(affinity.contains("us-east1-c", 8));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_filters_agree_with_sequential_ones() {
    let zones = ["us-east1-a", "us-east1-b", "us-east1-c", "us-east1-d"];
    let nodes: Vec<NodeRecord> = (0..40)
        .map(|i| node(&format!("node-{i:02}"), zones[i % zones.len()]))
        .collect();
    let plugin = plugin_for(
        ClusterSnapshot {
            nodes,
            workloads: vec![crdb()],
            volumes: vec![
                volume(0, Some("us-east1-d")),
                volume(2, Some("us-east1-b")),
                volume(5, Some("us-east1-b")),
            ],
            ..Default::default()
        },
        SchedulerConfig::default(),
    );

    let first = run_cycle(Arc::clone(&plugin), pod(5)).await.unwrap();

    let state = CycleState::new();
    let pod = pod(5);
    assert!(plugin.pre_filter(&state, &pod).await.is_success());
    for (name, status) in &first.nodes {
        assert_eq!(&plugin.filter(&state, &pod, name).await, status, "node {name}");
    }

    // Topology is [d, c, b, a]: ordinal 5 belongs in c and may follow its disk to b.
    for (name, status) in &first.nodes {
        let index: usize = name.trim_start_matches("node-").parse().unwrap();
        let zone = zones[index % zones.len()];
        let expected = zone == "us-east1-c" || zone == "us-east1-b";
        assert_eq!(status.is_success(), expected, "node {name} in {zone}");
    }
}
