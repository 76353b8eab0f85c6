//! Ideal zone ordering for ordinal-indexed replicas.
//!
//! A [`ZonalTopology`] is an ordered list of zones; replica `k` belongs in
//! `topology[k % len]`. The order starts from a size heuristic and is then
//! corrected so zones that already hold storage keep the replicas bound there.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;
use zonal_core::{Node, Ordinal, VolumeAffinity, Zone};

/// Ordered zones; `ordinal % len` indexes the ideal zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ZonalTopology(Vec<Zone>);

impl ZonalTopology {
    /// Ideal zone for `ordinal`. `None` when no zone hosts a node.
    pub fn ideal_zone(&self, ordinal: Ordinal) -> Option<&Zone> {
        if self.0.is_empty() {
            return None;
        }
        let slot = ordinal as usize % self.0.len();
        self.0.get(slot)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Affinity placing ordinal `i` in zone `i`. Rebuilding from it reproduces
    /// this topology.
    pub fn induced_affinity(&self) -> VolumeAffinity {
        self.0
            .iter()
            .enumerate()
            .map(|(i, zone)| (zone.clone(), i as Ordinal))
            .collect()
    }
}

impl From<Vec<Zone>> for ZonalTopology {
    fn from(zones: Vec<Zone>) -> Self {
        Self(zones)
    }
}

/// Determine the ordinal → zone mapping from the current node distribution
/// and existing volume placement.
///
/// Only zones hosting at least one node are considered. The default order is
/// largest zone first, ties broken alphabetically. Consider:
///
/// ```text
/// | A | B | C |
/// | 1 | 2 | 3 |
/// |   |   | 4 |
/// ```
///
/// Zone C must come first so ordinal 3 lands in it. Each zone holding storage
/// then claims the slot of its lowest ordinal, swapping with whichever zone
/// currently sits there. The single pass is a heuristic and does not always
/// find the optimal permutation.
pub fn build_zonal_topology(nodes: &[Node], affinity: &VolumeAffinity) -> ZonalTopology {
    let mut nodes_by_zone: BTreeMap<&str, usize> = BTreeMap::new();
    for node in nodes {
        *nodes_by_zone.entry(node.zone.as_str()).or_default() += 1;
    }

    let mut zones: Vec<Zone> = nodes_by_zone.keys().map(|zone| zone.to_string()).collect();
    zones.sort_by(|a, b| {
        nodes_by_zone[b.as_str()]
            .cmp(&nodes_by_zone[a.as_str()])
            .then_with(|| a.cmp(b))
    });

    // Iterate over a copy; swapping in place could otherwise skip a zone.
    let default_order = zones.clone();
    let len = zones.len();

    for zone in &default_order {
        let Some(lowest) = affinity.min_ordinal(zone) else {
            continue;
        };

        let slot = lowest as usize % len;
        if zones[slot] != *zone {
            swap_into(&mut zones, slot, zone);
            debug!(%zone, ordinal = lowest, slot, "corrected zone order for existing volumes");
        }
    }

    ZonalTopology(zones)
}

/// Move `zone` into `slot`, exchanging it with the zone currently there.
fn swap_into(zones: &mut [Zone], slot: usize, zone: &str) {
    if let Some(current) = zones.iter().position(|z| z == zone) {
        zones.swap(current, slot);
    }
}
