//! Full scheduling cycles: one pre-filter followed by concurrent filters.
//!
//! The host scheduler normally drives the two phases itself. This runner
//! reproduces that contract for offline evaluation and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::info;
use zonal_core::{ClusterLookup, PodRecord, VolumeLister};

use crate::error::{SchedulerError, SchedulerResult};
use crate::plugin::ZonalDistribution;
use crate::state::CycleState;
use crate::status::PredicateStatus;

/// Per-node verdicts for one pod.
#[derive(Debug, Clone, Serialize)]
pub struct CycleOutcome {
    pub pod: String,
    pub pre_filter: PredicateStatus,
    /// Empty when pre-filter did not succeed.
    pub nodes: BTreeMap<String, PredicateStatus>,
}

impl CycleOutcome {
    pub fn feasible_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, status)| status.is_success())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Run pre-filter for `pod`, then filter every known node concurrently.
///
/// A failed pre-filter ends the cycle without evaluating any node.
pub async fn run_cycle<C>(
    plugin: Arc<ZonalDistribution<C>>,
    pod: PodRecord,
) -> SchedulerResult<CycleOutcome>
where
    C: ClusterLookup + VolumeLister + 'static,
{
    let state = Arc::new(CycleState::new());
    let pod_key = pod.table_key();

    let pre_filter = plugin.pre_filter(&state, &pod).await;
    if !pre_filter.is_success() {
        return Ok(CycleOutcome {
            pod: pod_key,
            pre_filter,
            nodes: BTreeMap::new(),
        });
    }

    let node_names: Vec<String> = plugin
        .cluster()
        .list_nodes()?
        .into_iter()
        .map(|node| node.name)
        .collect();

    let pod = Arc::new(pod);
    let mut tasks = JoinSet::new();
    for name in node_names {
        let plugin = Arc::clone(&plugin);
        let state = Arc::clone(&state);
        let pod = Arc::clone(&pod);
        tasks.spawn(async move {
            let status = plugin.filter(&state, &pod, &name).await;
            (name, status)
        });
    }

    let mut nodes = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        let (name, status) = joined.map_err(|e| SchedulerError::Task(e.to_string()))?;
        nodes.insert(name, status);
    }

    let outcome = CycleOutcome {
        pod: pod_key,
        pre_filter,
        nodes,
    };
    info!(
        pod = %outcome.pod,
        evaluated = outcome.nodes.len(),
        feasible = outcome.feasible_nodes().len(),
        "scheduling cycle complete"
    );
    Ok(outcome)
}
