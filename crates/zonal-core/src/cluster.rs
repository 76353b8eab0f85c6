//! Cluster object records and the lookup traits the scheduler consumes.
//!
//! These mirror the handful of Kubernetes object fields the zonal predicate
//! reads. Anything that can serve them (an API client, a watch cache, the
//! embedded store in `zonal-state`) implements [`ClusterLookup`] and
//! [`VolumeLister`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for collaborator lookups.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Failures reported by a cluster data source. Propagated verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClusterError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    #[error("cluster backend error: {0}")]
    Backend(String),
}

impl ClusterError {
    pub fn not_found(kind: &str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            name: name.into(),
        }
    }
}

// ── Nodes ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl NodeRecord {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

// ── Pods ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerReference {
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodRecord {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub owner_references: Vec<OwnerReference>,
}

impl PodRecord {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// First owner reference of the given kind.
    pub fn owner_of_kind(&self, kind: &str) -> Option<&OwnerReference> {
        self.owner_references.iter().find(|owner| owner.kind == kind)
    }

    pub fn table_key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

// ── Workloads ─────────────────────────────────────────────────────

/// An ordinal-indexed replicated workload (a StatefulSet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadRecord {
    pub namespace: String,
    pub name: String,
    #[serde(default = "default_workload_kind")]
    pub kind: String,
    #[serde(default)]
    pub replicas: u32,
    /// Names of the declared volume claim templates.
    #[serde(default)]
    pub volume_claim_templates: Vec<String>,
}

fn default_workload_kind() -> String {
    "StatefulSet".to_string()
}

impl WorkloadRecord {
    pub fn table_key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    /// Claims stamped from `template` are named `<template>-<workload>-<ordinal>`.
    pub fn claim_prefix(&self, template: &str) -> String {
        format!("{template}-{}-", self.name)
    }
}

// ── Volumes ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum VolumePhase {
    Pending,
    Available,
    Bound,
    Released,
    Failed,
}

impl VolumePhase {
    /// Pending and bound volumes pin their claim's replica to a zone.
    pub fn constrains_placement(self) -> bool {
        matches!(self, Self::Pending | Self::Bound)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRef {
    #[serde(default)]
    pub namespace: String,
    pub name: String,
}

/// A persistent volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRecord {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub claim_ref: Option<ClaimRef>,
    pub phase: VolumePhase,
}

impl VolumeRecord {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// One page of a volume listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumePage {
    pub items: Vec<VolumeRecord>,
    /// Empty when the listing is exhausted.
    pub continue_token: String,
}

// ── Collaborators ─────────────────────────────────────────────────

/// Paginated enumeration of every persistent volume in the cluster.
pub trait VolumeLister: Send + Sync {
    /// Return up to `limit` volumes following `continue_token` (empty = start).
    fn list_volumes(&self, limit: usize, continue_token: &str) -> ClusterResult<VolumePage>;
}

/// Point lookups of live cluster objects.
pub trait ClusterLookup: Send + Sync {
    fn get_workload(&self, namespace: &str, name: &str) -> ClusterResult<WorkloadRecord>;

    fn get_pod(&self, namespace: &str, name: &str) -> ClusterResult<PodRecord>;

    fn get_node(&self, name: &str) -> ClusterResult<NodeRecord>;

    /// Live snapshot of every node known to the cluster.
    fn list_nodes(&self) -> ClusterResult<Vec<NodeRecord>>;
}
