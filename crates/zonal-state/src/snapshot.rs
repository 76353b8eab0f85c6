//! JSON cluster snapshots for offline evaluation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use zonal_core::{NodeRecord, PodRecord, VolumeRecord, WorkloadRecord};

use crate::error::{StateError, StateResult};

/// Point-in-time dump of the objects the predicate reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub pods: Vec<PodRecord>,
    #[serde(default)]
    pub workloads: Vec<WorkloadRecord>,
    #[serde(default)]
    pub volumes: Vec<VolumeRecord>,
}

impl ClusterSnapshot {
    pub fn from_file(path: &Path) -> StateResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StateError::Snapshot(format!("could not read {}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> StateResult<Self> {
        serde_json::from_str(content).map_err(|e| StateError::Deserialize(e.to_string()))
    }
}
