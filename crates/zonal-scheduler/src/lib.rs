//! zonal-scheduler: the zonal distribution predicate.
//!
//! Decides whether a StatefulSet replica may land on a candidate node. Each
//! scheduling cycle runs in two phases:
//!
//! - **PreFilter** (once per pod): resolve the owning StatefulSet, scan its
//!   persistent volumes, and publish the resulting volume affinity into the
//!   cycle's [`CycleState`].
//! - **Filter** (once per candidate node, possibly concurrently): rebuild the
//!   zonal topology from the live node set, find the replica's ideal zone,
//!   and admit the node if it is in that zone or already holds the replica's
//!   storage.
//!
//! # Architecture
//!
//! ```text
//! ZonalDistribution<C>
//!   ├── C: ClusterLookup + VolumeLister (workloads, nodes, volumes)
//!   ├── SchedulerConfig (labels, owner kind, page size)
//!   └── per cycle: CycleState (write-once VolumeAffinity behind RwLock)
//! ```

pub mod cycle;
pub mod error;
pub mod plugin;
pub mod state;
pub mod status;

pub use cycle::{CycleOutcome, run_cycle};
pub use error::{SchedulerError, SchedulerResult};
pub use plugin::ZonalDistribution;
pub use state::CycleState;
pub use status::PredicateStatus;
