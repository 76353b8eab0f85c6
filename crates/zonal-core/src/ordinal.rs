//! Replica ordinal parsing.

use crate::types::Ordinal;

/// Delimiter between a workload name and the replica ordinal.
pub const ORDINAL_DELIMITER: char = '-';

/// Extract the ordinal suffix from a replica name such as `cockroachdb-2`.
///
/// Returns `None` when the name has no delimiter or the final segment is not
/// a non-negative integer. Pods outside ordinal-indexed workloads land here.
pub fn pod_ordinal(name: &str) -> Option<Ordinal> {
    let (_, suffix) = name.rsplit_once(ORDINAL_DELIMITER)?;
    suffix.parse().ok()
}
