//! Per-cycle state shared between pre-filter and filter calls.

use std::sync::Arc;

use tokio::sync::RwLock;
use zonal_core::VolumeAffinity;

use crate::error::{SchedulerError, SchedulerResult};

/// Holds the volume affinity computed by pre-filter for one pod.
///
/// Written exactly once, then read by every filter call of the cycle. Readers
/// receive an `Arc` snapshot and release the lock immediately.
#[derive(Debug, Default)]
pub struct CycleState {
    affinity: RwLock<Option<Arc<VolumeAffinity>>>,
}

impl CycleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the cycle's volume affinity. Fails if already published.
    pub async fn publish(&self, affinity: VolumeAffinity) -> SchedulerResult<()> {
        let mut slot = self.affinity.write().await;
        if slot.is_some() {
            return Err(SchedulerError::AlreadyPrepared);
        }
        *slot = Some(Arc::new(affinity));
        Ok(())
    }

    /// The published volume affinity.
    pub async fn volume_affinity(&self) -> SchedulerResult<Arc<VolumeAffinity>> {
        self.affinity
            .read()
            .await
            .clone()
            .ok_or(SchedulerError::NotPrepared)
    }
}
