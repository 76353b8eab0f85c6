//! Domain types shared by the topology builder and the decision engine.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A failure-domain label value. Opaque; ordered lexicographically for tie-breaks.
pub type Zone = String;

/// Index of a replica within an ordinal-indexed workload.
pub type Ordinal = u32;

/// A schedulable node attributed to a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub zone: Zone,
}

impl Node {
    pub fn new(name: impl Into<String>, zone: impl Into<Zone>) -> Self {
        Self {
            name: name.into(),
            zone: zone.into(),
        }
    }
}

/// Zone → ordinals whose storage is already bound or pending in that zone.
///
/// Backed by ordered collections so iteration (and anything derived from it)
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolumeAffinity {
    zones: BTreeMap<Zone, BTreeSet<Ordinal>>,
}

impl VolumeAffinity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `ordinal` as resident in `zone`.
    pub fn insert(&mut self, zone: impl Into<Zone>, ordinal: Ordinal) {
        self.zones.entry(zone.into()).or_default().insert(ordinal);
    }

    /// Whether `ordinal` has storage in `zone`.
    pub fn contains(&self, zone: &str, ordinal: Ordinal) -> bool {
        self.zones
            .get(zone)
            .is_some_and(|ordinals| ordinals.contains(&ordinal))
    }

    /// The zone holding storage for `ordinal`, if any.
    pub fn zone_of(&self, ordinal: Ordinal) -> Option<&Zone> {
        self.zones
            .iter()
            .find(|(_, ordinals)| ordinals.contains(&ordinal))
            .map(|(zone, _)| zone)
    }

    /// Lowest ordinal recorded in `zone`. `None` for unknown or empty zones.
    pub fn min_ordinal(&self, zone: &str) -> Option<Ordinal> {
        self.zones
            .get(zone)
            .and_then(|ordinals| ordinals.first().copied())
    }

    pub fn ordinals(&self, zone: &str) -> Option<&BTreeSet<Ordinal>> {
        self.zones.get(zone)
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.values().all(BTreeSet::is_empty)
    }

    /// Total number of recorded ordinals across all zones.
    pub fn len(&self) -> usize {
        self.zones.values().map(BTreeSet::len).sum()
    }
}

impl<Z: Into<Zone>> FromIterator<(Z, Ordinal)> for VolumeAffinity {
    fn from_iter<I: IntoIterator<Item = (Z, Ordinal)>>(iter: I) -> Self {
        let mut affinity = Self::new();
        for (zone, ordinal) in iter {
            affinity.insert(zone, ordinal);
        }
        affinity
    }
}
