//! Scheduler configuration (`zonal.toml`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SCHEDULER_NAME: &str = "crl-scheduler";
pub const DEFAULT_PLUGIN_NAME: &str = "ZonalDistribution";
pub const DEFAULT_ZONE_LABEL: &str = "failure-domain.beta.kubernetes.io/zone";
pub const DEFAULT_STATEFULSET_POD_LABEL: &str = "statefulset.kubernetes.io/pod-name";
pub const DEFAULT_WORKLOAD_KIND: &str = "StatefulSet";
pub const DEFAULT_PAGE_SIZE: usize = 100;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Pods opt in by setting `spec.schedulerName` to this value.
    pub scheduler_name: String,
    /// Name the predicate registers under in the host scheduler.
    pub plugin_name: String,
    /// Label carrying the zone on nodes and persistent volumes.
    pub zone_label: String,
    /// Label present on every pod created by a StatefulSet.
    pub statefulset_pod_label: String,
    /// Owner reference kind of the parent workload.
    pub workload_kind: String,
    /// Page size for the persistent volume scan.
    pub page_size: usize,
    pub leader_elect: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scheduler_name: DEFAULT_SCHEDULER_NAME.to_string(),
            plugin_name: DEFAULT_PLUGIN_NAME.to_string(),
            zone_label: DEFAULT_ZONE_LABEL.to_string(),
            statefulset_pod_label: DEFAULT_STATEFULSET_POD_LABEL.to_string(),
            workload_kind: DEFAULT_WORKLOAD_KIND.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            leader_elect: false,
        }
    }
}

impl SchedulerConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: SchedulerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let required = [
            ("scheduler_name", &self.scheduler_name),
            ("plugin_name", &self.plugin_name),
            ("zone_label", &self.zone_label),
            ("statefulset_pod_label", &self.statefulset_pod_label),
            ("workload_kind", &self.workload_kind),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must not be empty")));
            }
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be greater than 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = SchedulerConfig::from_toml_str("").unwrap();
        assert_eq!(config, SchedulerConfig::default());
        assert_eq!(config.page_size, 100);
        assert_eq!(config.zone_label, "failure-domain.beta.kubernetes.io/zone");
    }

    #[test]
    fn overrides_selected_fields() {
        let config = SchedulerConfig::from_toml_str(
            r#"
scheduler_name = "zonal"
zone_label = "topology.kubernetes.io/zone"
page_size = 25
"#,
        )
        .unwrap();
        assert_eq!(config.scheduler_name, "zonal");
        assert_eq!(config.zone_label, "topology.kubernetes.io/zone");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.workload_kind, "StatefulSet");
    }

    #[test]
    fn rejects_zero_page_size() {
        let err = SchedulerConfig::from_toml_str("page_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_blank_zone_label() {
        let err = SchedulerConfig::from_toml_str(r#"zone_label = " ""#).unwrap_err();
        assert!(err.to_string().contains("zone_label"));
    }

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zonal.toml");
        let mut config = SchedulerConfig::default();
        config.leader_elect = true;
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        assert_eq!(SchedulerConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_names_path() {
        let err = SchedulerConfig::from_file(Path::new("/nonexistent/zonal.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/zonal.toml"));
    }
}
