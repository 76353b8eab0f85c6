//! Conversion from node records to zone-attributed nodes.

use tracing::debug;
use zonal_core::{Node, NodeRecord};

/// Convert node records into [`Node`]s, skipping nodes without `zone_label`.
///
/// Zone-less nodes cannot be attributed to a failure domain, so they never
/// contribute to the topology.
pub fn nodes_from_records(records: &[NodeRecord], zone_label: &str) -> Vec<Node> {
    records
        .iter()
        .filter_map(|record| match record.label(zone_label) {
            Some(zone) => Some(Node::new(record.name.clone(), zone)),
            None => {
                debug!(node = %record.name, label = zone_label, "skipping node without zone");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const ZONE: &str = "topology.kubernetes.io/zone";

    fn record(name: &str, zone: Option<&str>) -> NodeRecord {
        let mut labels = BTreeMap::new();
        labels.insert("kubernetes.io/hostname".to_string(), name.to_string());
        if let Some(zone) = zone {
            labels.insert(ZONE.to_string(), zone.to_string());
        }
        NodeRecord {
            name: name.to_string(),
            labels,
        }
    }

    #[test]
    fn converts_zoned_nodes() {
        let nodes = nodes_from_records(&[record("n1", Some("A")), record("n2", Some("B"))], ZONE);
        assert_eq!(nodes, vec![Node::new("n1", "A"), Node::new("n2", "B")]);
    }

    #[test]
    fn skips_nodes_without_zone() {
        let nodes = nodes_from_records(&[record("n1", None), record("n2", Some("B"))], ZONE);
        assert_eq!(nodes, vec![Node::new("n2", "B")]);
    }

    #[test]
    fn honours_configured_label() {
        let nodes = nodes_from_records(&[record("n1", Some("A"))], "failure-domain.beta.kubernetes.io/zone");
        assert!(nodes.is_empty());
    }
}
