//! Scheduler error types.

use thiserror::Error;
use zonal_core::{ClusterError, Ordinal};
use zonal_placement::CollectError;

/// Errors that abort a pre-filter (whole cycle) or a single filter call.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("could not find owning {0}")]
    NoOwner(String),

    #[error("could not find owning {kind} {name}: {source}")]
    WorkloadLookup {
        kind: String,
        name: String,
        source: ClusterError,
    },

    #[error("could not build volume affinity: {0}")]
    Collect(#[from] CollectError),

    #[error("cluster lookup failed: {0}")]
    Cluster(#[from] ClusterError),

    #[error("volume affinity not computed for this cycle")]
    NotPrepared,

    #[error("volume affinity already published for this cycle")]
    AlreadyPrepared,

    #[error("no zones available to place ordinal {0}")]
    EmptyTopology(Ordinal),

    #[error("filter task failed: {0}")]
    Task(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
