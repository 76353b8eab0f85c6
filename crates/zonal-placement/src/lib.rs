//! Zonal placement: ordinal → zone inference for StatefulSet replicas.
//!
//! This crate holds the pure decision inputs of the zonal predicate. It does
//! NOT talk to the host scheduler (that's `zonal-scheduler`). Instead, it
//! turns cluster records into a [`VolumeAffinity`](zonal_core::VolumeAffinity)
//! and a [`ZonalTopology`] the engine consults per candidate node.
//!
//! # Components
//!
//! - **`topology`**: Ideal zone ordering (size heuristic + affinity correction)
//! - **`volumes`**: Paginated persistent volume scan → volume affinity
//! - **`nodes`**: Node records → zone-attributed nodes

pub mod nodes;
pub mod topology;
pub mod volumes;

pub use nodes::nodes_from_records;
pub use topology::{ZonalTopology, build_zonal_topology};
pub use volumes::{CollectError, CollectResult, build_volume_affinity, for_all_volumes};
