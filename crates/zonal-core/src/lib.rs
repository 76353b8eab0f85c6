pub mod cluster;
pub mod config;
pub mod ordinal;
pub mod types;

pub use cluster::{
    ClaimRef, ClusterError, ClusterLookup, ClusterResult, NodeRecord, OwnerReference, PodRecord,
    VolumeLister, VolumePage, VolumePhase, VolumeRecord, WorkloadRecord,
};
pub use config::{ConfigError, SchedulerConfig};
pub use ordinal::pod_ordinal;
pub use types::*;
