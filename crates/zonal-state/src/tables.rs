//! redb table definitions for the cluster object store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized records).

use redb::TableDefinition;

/// Nodes keyed by `{name}`.
pub const NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("nodes");

/// Pods keyed by `{namespace}/{name}`.
pub const PODS: TableDefinition<&str, &[u8]> = TableDefinition::new("pods");

/// StatefulSets keyed by `{namespace}/{name}`.
pub const WORKLOADS: TableDefinition<&str, &[u8]> = TableDefinition::new("workloads");

/// Persistent volumes keyed by `{name}`.
pub const VOLUMES: TableDefinition<&str, &[u8]> = TableDefinition::new("volumes");
