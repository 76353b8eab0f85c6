//! StateStore: redb-backed cluster object store.
//!
//! Provides typed CRUD operations over nodes, pods, workloads, and persistent
//! volumes, plus the paginated volume listing the affinity collector walks.
//! All values are JSON-serialized into redb's `&[u8]` value columns. The store
//! supports both on-disk and in-memory backends (the latter for testing).

use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use zonal_core::{
    ClusterError, ClusterLookup, ClusterResult, NodeRecord, PodRecord, VolumeLister, VolumePage,
    VolumeRecord, WorkloadRecord,
};

use crate::error::{StateError, StateResult};
use crate::snapshot::ClusterSnapshot;
use crate::tables::*;

type Table = TableDefinition<'static, &'static str, &'static [u8]>;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe cluster object store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store.
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(NODES).map_err(map_err!(Table))?;
        txn.open_table(PODS).map_err(map_err!(Table))?;
        txn.open_table(WORKLOADS).map_err(map_err!(Table))?;
        txn.open_table(VOLUMES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Generic record access ──────────────────────────────────────

    fn put_record<T: Serialize>(&self, table: Table, key: &str, record: &T) -> StateResult<()> {
        let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            table
                .insert(key, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get_record<T: DeserializeOwned>(&self, table: Table, key: &str) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let record: T =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn list_records<T: DeserializeOwned>(&self, table: Table) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let record: T = serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(record);
        }
        Ok(results)
    }

    fn delete_record(&self, table: Table, key: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(table).map_err(map_err!(Table))?;
            existed = table.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(existed)
    }

    // ── Nodes ──────────────────────────────────────────────────────

    pub fn put_node(&self, node: &NodeRecord) -> StateResult<()> {
        self.put_record(NODES, &node.name, node)
    }

    pub fn find_node(&self, name: &str) -> StateResult<Option<NodeRecord>> {
        self.get_record(NODES, name)
    }

    pub fn delete_node(&self, name: &str) -> StateResult<bool> {
        self.delete_record(NODES, name)
    }

    // ── Pods ───────────────────────────────────────────────────────

    pub fn put_pod(&self, pod: &PodRecord) -> StateResult<()> {
        self.put_record(PODS, &pod.table_key(), pod)
    }

    /// Get a pod by `{namespace}/{name}` key.
    pub fn find_pod(&self, key: &str) -> StateResult<Option<PodRecord>> {
        self.get_record(PODS, key)
    }

    pub fn list_pods(&self) -> StateResult<Vec<PodRecord>> {
        self.list_records(PODS)
    }

    pub fn delete_pod(&self, key: &str) -> StateResult<bool> {
        self.delete_record(PODS, key)
    }

    // ── Workloads ──────────────────────────────────────────────────

    pub fn put_workload(&self, workload: &WorkloadRecord) -> StateResult<()> {
        let key = workload.table_key();
        self.put_record(WORKLOADS, &key, workload)?;
        debug!(%key, "workload stored");
        Ok(())
    }

    /// Get a workload by `{namespace}/{name}` key.
    pub fn find_workload(&self, key: &str) -> StateResult<Option<WorkloadRecord>> {
        self.get_record(WORKLOADS, key)
    }

    pub fn list_workloads(&self) -> StateResult<Vec<WorkloadRecord>> {
        self.list_records(WORKLOADS)
    }

    pub fn delete_workload(&self, key: &str) -> StateResult<bool> {
        self.delete_record(WORKLOADS, key)
    }

    // ── Volumes ────────────────────────────────────────────────────

    pub fn put_volume(&self, volume: &VolumeRecord) -> StateResult<()> {
        self.put_record(VOLUMES, &volume.name, volume)
    }

    pub fn find_volume(&self, name: &str) -> StateResult<Option<VolumeRecord>> {
        self.get_record(VOLUMES, name)
    }

    pub fn delete_volume(&self, name: &str) -> StateResult<bool> {
        self.delete_record(VOLUMES, name)
    }

    /// Return up to `limit` volumes whose keys sort strictly after
    /// `continue_token`. A `limit` of zero returns everything.
    ///
    /// The returned token is the last key of the page when more volumes
    /// remain, and empty once the listing is exhausted.
    pub fn list_volumes_page(&self, limit: usize, continue_token: &str) -> StateResult<VolumePage> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(VOLUMES).map_err(map_err!(Table))?;
        let entries = if continue_token.is_empty() {
            table.iter().map_err(map_err!(Read))?
        } else {
            let bounds: (Bound<&str>, Bound<&str>) =
                (Bound::Excluded(continue_token), Bound::Unbounded);
            table.range::<&str>(bounds).map_err(map_err!(Read))?
        };

        let mut items = Vec::new();
        let mut last_key = String::new();
        let mut exhausted = true;
        for entry in entries {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if limit > 0 && items.len() == limit {
                exhausted = false;
                break;
            }
            let volume: VolumeRecord =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            last_key = key.value().to_string();
            items.push(volume);
        }

        debug!(count = items.len(), exhausted, "volume page listed");
        Ok(VolumePage {
            items,
            continue_token: if exhausted { String::new() } else { last_key },
        })
    }

    // ── Snapshots ──────────────────────────────────────────────────

    /// Load every record of a snapshot into the store in one transaction.
    pub fn import_snapshot(&self, snapshot: &ClusterSnapshot) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut nodes = txn.open_table(NODES).map_err(map_err!(Table))?;
            for node in &snapshot.nodes {
                let value = serde_json::to_vec(node).map_err(map_err!(Serialize))?;
                nodes
                    .insert(node.name.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }

            let mut pods = txn.open_table(PODS).map_err(map_err!(Table))?;
            for pod in &snapshot.pods {
                let value = serde_json::to_vec(pod).map_err(map_err!(Serialize))?;
                pods.insert(pod.table_key().as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }

            let mut workloads = txn.open_table(WORKLOADS).map_err(map_err!(Table))?;
            for workload in &snapshot.workloads {
                let value = serde_json::to_vec(workload).map_err(map_err!(Serialize))?;
                workloads
                    .insert(workload.table_key().as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }

            let mut volumes = txn.open_table(VOLUMES).map_err(map_err!(Table))?;
            for volume in &snapshot.volumes {
                let value = serde_json::to_vec(volume).map_err(map_err!(Serialize))?;
                volumes
                    .insert(volume.name.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(
            nodes = snapshot.nodes.len(),
            pods = snapshot.pods.len(),
            workloads = snapshot.workloads.len(),
            volumes = snapshot.volumes.len(),
            "snapshot imported"
        );
        Ok(())
    }
}

impl VolumeLister for StateStore {
    fn list_volumes(&self, limit: usize, continue_token: &str) -> ClusterResult<VolumePage> {
        Ok(self.list_volumes_page(limit, continue_token)?)
    }
}

impl ClusterLookup for StateStore {
    fn get_workload(&self, namespace: &str, name: &str) -> ClusterResult<WorkloadRecord> {
        let key = format!("{namespace}/{name}");
        self.find_workload(&key)?
            .ok_or_else(|| ClusterError::not_found("statefulset", key))
    }

    fn get_pod(&self, namespace: &str, name: &str) -> ClusterResult<PodRecord> {
        let key = format!("{namespace}/{name}");
        self.find_pod(&key)?
            .ok_or_else(|| ClusterError::not_found("pod", key))
    }

    fn get_node(&self, name: &str) -> ClusterResult<NodeRecord> {
        self.find_node(name)?
            .ok_or_else(|| ClusterError::not_found("node", name))
    }

    fn list_nodes(&self) -> ClusterResult<Vec<NodeRecord>> {
        Ok(self.list_records(NODES)?)
    }
}
