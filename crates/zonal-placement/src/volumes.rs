//! Persistent volume scan producing a workload's [`VolumeAffinity`].
//!
//! Every pending or bound volume whose claim was stamped from one of the
//! workload's claim templates, in the workload's namespace, pins that replica's ordinal to the volume's
//! zone. Any inconsistency aborts the scan: a partial view could approve a
//! placement that strands a replica away from its storage.

use thiserror::Error;
use tracing::{debug, info};
use zonal_core::{
    ClusterError, Ordinal, VolumeAffinity, VolumeLister, VolumeRecord, WorkloadRecord, Zone,
};

pub type CollectResult<T> = Result<T, CollectError>;

/// Errors raised while collecting volume affinity.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("volume {volume}: claim {claim} does not end in an ordinal")]
    MalformedClaim { volume: String, claim: String },

    #[error("volume {volume} has no zone label {label}")]
    MissingZone { volume: String, label: String },

    #[error("ordinal {ordinal} has volumes in both {first} and {second}")]
    ConflictingZones {
        ordinal: Ordinal,
        first: Zone,
        second: Zone,
    },

    #[error("volume listing failed: {0}")]
    Lookup(#[from] ClusterError),
}

/// Run `callback` on every volume, following continue tokens page by page.
///
/// Stops once the token comes back empty or a page is short. Listing and
/// callback errors end the walk early and are returned as-is.
pub fn for_all_volumes<L, E, F>(lister: &L, page_size: usize, mut callback: F) -> Result<(), E>
where
    L: VolumeLister + ?Sized,
    E: From<ClusterError>,
    F: FnMut(&VolumeRecord) -> Result<(), E>,
{
    let mut page = lister.list_volumes(page_size, "")?;
    loop {
        for volume in &page.items {
            callback(volume)?;
        }

        if page.continue_token.is_empty() || page.items.len() < page_size {
            return Ok(());
        }

        page = lister.list_volumes(page_size, &page.continue_token)?;
    }
}

/// Find every volume created for `workload` and the zone it lives in.
///
/// The following would indicate that ordinals 0 and 1 both have a volume in
/// `zone-a` (the pods themselves may or may not exist):
///
/// ```text
/// { "zone-a": [0, 1] }
/// ```
pub fn build_volume_affinity<L>(
    lister: &L,
    workload: &WorkloadRecord,
    zone_label: &str,
    page_size: usize,
) -> CollectResult<VolumeAffinity>
where
    L: VolumeLister + ?Sized,
{
    let prefixes: Vec<String> = workload
        .volume_claim_templates
        .iter()
        .map(|template| workload.claim_prefix(template))
        .collect();

    let mut affinity = VolumeAffinity::new();
    let mut scanned = 0usize;

    for_all_volumes(lister, page_size, |volume| {
        scanned += 1;

        let Some(claim) = &volume.claim_ref else {
            return Ok(());
        };

        // Same-named workloads in other namespaces stamp identical claim names.
        if claim.namespace != workload.namespace {
            return Ok(());
        }

        // Released or failed volumes no longer hold a replica in place.
        if !volume.phase.constrains_placement() {
            return Ok(());
        }

        let Some(suffix) = prefixes
            .iter()
            .find_map(|prefix| claim.name.strip_prefix(prefix.as_str()))
        else {
            return Ok(());
        };

        let ordinal: Ordinal = suffix.parse().map_err(|_| CollectError::MalformedClaim {
            volume: volume.name.clone(),
            claim: claim.name.clone(),
        })?;

        let zone = volume
            .label(zone_label)
            .ok_or_else(|| CollectError::MissingZone {
                volume: volume.name.clone(),
                label: zone_label.to_string(),
            })?;

        if let Some(home) = affinity.zone_of(ordinal) {
            if home != zone {
                return Err(CollectError::ConflictingZones {
                    ordinal,
                    first: home.clone(),
                    second: zone.to_string(),
                });
            }
        }

        debug!(volume = %volume.name, claim = %claim.name, ordinal, %zone, "volume pins ordinal");
        affinity.insert(zone, ordinal);
        Ok(())
    })?;

    info!(
        workload = %workload.table_key(),
        scanned,
        ordinals = affinity.len(),
        "collected volume affinity"
    );
    Ok(affinity)
}
