//! The zonal distribution predicate.

use std::sync::Arc;

use tracing::{debug, info, warn};
use zonal_core::{
    ClusterLookup, Ordinal, PodRecord, SchedulerConfig, VolumeLister, WorkloadRecord, Zone,
    pod_ordinal,
};
use zonal_placement::{build_volume_affinity, build_zonal_topology, nodes_from_records};

use crate::error::{SchedulerError, SchedulerResult};
use crate::state::CycleState;
use crate::status::PredicateStatus;

/// Spreads StatefulSet replicas across zones by ordinal while never pulling a
/// replica away from volumes it already has in some zone.
pub struct ZonalDistribution<C> {
    cluster: Arc<C>,
    config: SchedulerConfig,
}

impl<C> ZonalDistribution<C>
where
    C: ClusterLookup + VolumeLister,
{
    pub fn new(cluster: Arc<C>, config: SchedulerConfig) -> Self {
        Self { cluster, config }
    }

    /// Name the predicate registers under in the host scheduler.
    pub fn name(&self) -> &str {
        &self.config.plugin_name
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn cluster(&self) -> &Arc<C> {
        &self.cluster
    }

    /// Compute and publish the owning StatefulSet's volume affinity.
    ///
    /// Runs once per cycle, before any filter call. The volume scan is done
    /// here rather than per node to avoid hitting the API server per candidate.
    pub async fn pre_filter(&self, state: &CycleState, pod: &PodRecord) -> PredicateStatus {
        match self.prepare(state, pod).await {
            Ok(()) => PredicateStatus::Success,
            Err(err) => {
                warn!(pod = %pod.table_key(), error = %err, "pre-filter failed");
                err.into()
            }
        }
    }

    async fn prepare(&self, state: &CycleState, pod: &PodRecord) -> SchedulerResult<()> {
        let workload = self.owning_workload(pod)?;

        let affinity = build_volume_affinity(
            self.cluster.as_ref(),
            &workload,
            &self.config.zone_label,
            self.config.page_size,
        )?;

        info!(
            pod = %pod.table_key(),
            workload = %workload.name,
            affinity = ?affinity,
            "built volume zonal distribution"
        );

        state.publish(affinity).await
    }

    fn owning_workload(&self, pod: &PodRecord) -> SchedulerResult<WorkloadRecord> {
        let kind = &self.config.workload_kind;
        let owner = pod
            .owner_of_kind(kind)
            .ok_or_else(|| SchedulerError::NoOwner(kind.clone()))?;

        self.cluster
            .get_workload(&pod.namespace, &owner.name)
            .map_err(|source| SchedulerError::WorkloadLookup {
                kind: kind.clone(),
                name: owner.name.clone(),
                source,
            })
    }

    /// Decide whether `pod` may run on `node_name`.
    pub async fn filter(&self, state: &CycleState, pod: &PodRecord, node_name: &str) -> PredicateStatus {
        match self.evaluate(state, pod, node_name).await {
            Ok(status) => status,
            Err(err) => {
                warn!(pod = %pod.name, node = %node_name, error = %err, "filter failed");
                err.into()
            }
        }
    }

    async fn evaluate(
        &self,
        state: &CycleState,
        pod: &PodRecord,
        node_name: &str,
    ) -> SchedulerResult<PredicateStatus> {
        // Pods outside an ordinal-indexed workload are not constrained.
        let Some(ordinal) = self.replica_ordinal(pod) else {
            return Ok(PredicateStatus::Success);
        };

        let node = self.cluster.get_node(node_name)?;
        let Some(node_zone) = node.label(&self.config.zone_label) else {
            return Ok(PredicateStatus::unschedulable("no zonal information found"));
        };

        let affinity = state.volume_affinity().await?;

        // The topology depends on the full node set, which is only known here.
        let nodes = nodes_from_records(&self.cluster.list_nodes()?, &self.config.zone_label);
        let topology = build_zonal_topology(&nodes, &affinity);
        let ideal_zone: &Zone = topology
            .ideal_zone(ordinal)
            .ok_or(SchedulerError::EmptyTopology(ordinal))?;

        debug!(nodes = ?nodes, "built node list");
        debug!(topology = ?topology.zones(), "built ideal zonal topology");
        info!(pod = %pod.name, ordinal, ideal_zone = %ideal_zone, "ideal zone for ordinal");

        if ideal_zone == node_zone {
            return Ok(PredicateStatus::Success);
        }

        // Never strand a replica away from its volumes.
        if affinity.contains(node_zone, ordinal) {
            warn!(
                pod = %pod.name,
                node = %node_name,
                zone = %node_zone,
                "pod allowed outside its ideal zone to follow its volumes"
            );
            return Ok(PredicateStatus::Success);
        }

        Ok(PredicateStatus::unschedulable(format!(
            "not in ideal zone {ideal_zone}"
        )))
    }

    /// Ordinal of a StatefulSet pod; `None` for anything else.
    fn replica_ordinal(&self, pod: &PodRecord) -> Option<Ordinal> {
        pod.label(&self.config.statefulset_pod_label)?;
        pod_ordinal(&pod.name)
    }
}
