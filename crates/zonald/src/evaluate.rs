//! Offline evaluation against a cluster snapshot.
//!
//! Loads a JSON snapshot into an in-memory store and runs the same code paths
//! the host scheduler drives, printing the verdicts.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tracing::info;
use zonal_core::{ClusterLookup, Ordinal, SchedulerConfig, VolumeAffinity, Zone};
use zonal_placement::{
    ZonalTopology, build_volume_affinity, build_zonal_topology, nodes_from_records,
};
use zonal_scheduler::{CycleOutcome, ZonalDistribution, run_cycle};
use zonal_state::{ClusterSnapshot, StateStore};

/// Output rendering for evaluation commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Split `namespace/name`; a bare name lives in `default`.
pub fn split_key(key: &str) -> (&str, &str) {
    key.split_once('/').unwrap_or(("default", key))
}

fn load_store(snapshot_path: &Path) -> anyhow::Result<StateStore> {
    let snapshot = ClusterSnapshot::from_file(snapshot_path)?;
    let store = StateStore::open_in_memory()?;
    store.import_snapshot(&snapshot)?;
    info!(path = %snapshot_path.display(), nodes = snapshot.nodes.len(), "snapshot loaded");
    Ok(store)
}

/// Run a full scheduling cycle for `pod_key`. Fails when pre-filter fails.
pub async fn run_evaluate(
    config: SchedulerConfig,
    snapshot_path: &Path,
    pod_key: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let store = Arc::new(load_store(snapshot_path)?);
    let (namespace, name) = split_key(pod_key);
    let pod = store
        .get_pod(namespace, name)
        .with_context(|| format!("could not load pod {pod_key}"))?;

    let plugin = Arc::new(ZonalDistribution::new(store, config));
    let outcome = run_cycle(plugin, pod).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => print!("{}", render_outcome(&outcome)),
    }

    if !outcome.pre_filter.is_success() {
        anyhow::bail!("pre-filter failed for {}: {}", outcome.pod, outcome.pre_filter);
    }
    Ok(())
}

pub fn render_outcome(outcome: &CycleOutcome) -> String {
    let mut out = format!("pod {}\n  pre-filter: {}\n", outcome.pod, outcome.pre_filter);
    for (node, status) in &outcome.nodes {
        out.push_str(&format!("  {node}: {status}\n"));
    }
    out
}

/// Volume affinity, topology, and per-ordinal ideal zones for a workload.
#[derive(Debug, Clone, Serialize)]
pub struct TopologyReport {
    pub workload: String,
    pub affinity: VolumeAffinity,
    pub topology: ZonalTopology,
    pub ideal_zones: Vec<(Ordinal, Zone)>,
}

pub fn build_topology_report(
    store: &StateStore,
    config: &SchedulerConfig,
    workload_key: &str,
) -> anyhow::Result<TopologyReport> {
    let (namespace, name) = split_key(workload_key);
    let workload = store
        .get_workload(namespace, name)
        .with_context(|| format!("could not load workload {workload_key}"))?;

    let affinity = build_volume_affinity(store, &workload, &config.zone_label, config.page_size)?;
    let nodes = nodes_from_records(&store.list_nodes()?, &config.zone_label);
    let topology = build_zonal_topology(&nodes, &affinity);

    let ideal_zones = (0..workload.replicas)
        .filter_map(|ordinal| {
            topology
                .ideal_zone(ordinal)
                .map(|zone| (ordinal, zone.clone()))
        })
        .collect();

    Ok(TopologyReport {
        workload: workload.table_key(),
        affinity,
        topology,
        ideal_zones,
    })
}

pub fn run_topology(
    config: &SchedulerConfig,
    snapshot_path: &Path,
    workload_key: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let store = load_store(snapshot_path)?;
    let report = build_topology_report(&store, config, workload_key)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("workload {}", report.workload);
            println!("  topology: [{}]", report.topology.zones().join(", "));
            for zone in report.affinity.zones() {
                let ordinals: Vec<String> = report
                    .affinity
                    .ordinals(zone)
                    .into_iter()
                    .flatten()
                    .map(|o| o.to_string())
                    .collect();
                println!("  volumes in {zone}: {}", ordinals.join(", "));
            }
            for (ordinal, zone) in &report.ideal_zones {
                println!("  ordinal {ordinal} -> {zone}");
            }
        }
    }
    Ok(())
}
