//! zonal-state: embedded cluster object store.
//!
//! Backed by [redb](https://docs.rs/redb). Holds the nodes, pods, workloads,
//! and persistent volumes the zonal predicate reads, and serves them through
//! the `zonal_core` collaborator traits.
//!
//! # Architecture
//!
//! All records are JSON-serialized into redb's `&[u8]` value columns.
//! Namespaced records use `{namespace}/{name}` keys; cluster-scoped records
//! (nodes, volumes) use their bare name. Volume listing is paginated by key
//! order, with the last key of a page serving as the continuation token.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`).

pub mod error;
pub mod snapshot;
pub mod store;
pub mod tables;

pub use error::{StateError, StateResult};
pub use snapshot::ClusterSnapshot;
pub use store::StateStore;
