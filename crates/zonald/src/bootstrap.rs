//! In-cluster bootstrap: kubeconfig and host scheduler configuration.
//!
//! The host scheduler is pointed at a kubeconfig built from the pod's service
//! account and a configuration file enabling the zonal predicate in both the
//! pre-filter and filter extension points.

use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tracing::info;
use zonal_core::SchedulerConfig;

/// Name shared by the kubeconfig cluster, context, and user entries.
const KUBECONFIG_ENTRY: &str = "default";

pub const DEFAULT_TOKEN_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
pub const DEFAULT_ROOT_CA_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";

/// Service account credentials mounted into the pod.
#[derive(Debug, Clone)]
pub struct ServiceAccount {
    pub token_file: PathBuf,
    pub root_ca_file: PathBuf,
}

impl Default for ServiceAccount {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            root_ca_file: PathBuf::from(DEFAULT_ROOT_CA_FILE),
        }
    }
}

// ── Kubeconfig ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct KubeConfig {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    kind: &'static str,
    #[serde(rename = "current-context")]
    current_context: &'static str,
    clusters: Vec<NamedCluster>,
    contexts: Vec<NamedContext>,
    users: Vec<NamedUser>,
}

#[derive(Debug, Serialize)]
struct NamedCluster {
    name: &'static str,
    cluster: ClusterEntry,
}

#[derive(Debug, Serialize)]
struct ClusterEntry {
    #[serde(rename = "certificate-authority-data")]
    certificate_authority_data: String,
    server: String,
}

#[derive(Debug, Serialize)]
struct NamedContext {
    name: &'static str,
    context: ContextEntry,
}

#[derive(Debug, Serialize)]
struct ContextEntry {
    cluster: &'static str,
    user: &'static str,
}

#[derive(Debug, Serialize)]
struct NamedUser {
    name: &'static str,
    user: UserEntry,
}

#[derive(Debug, Serialize)]
struct UserEntry {
    token: String,
}

/// `https://host:port`, bracketing IPv6 literals.
pub fn api_server_url(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("https://[{host}]:{port}")
    } else {
        format!("https://{host}:{port}")
    }
}

/// Write a kubeconfig authenticating as the mounted service account.
pub fn write_in_cluster_kubeconfig(
    path: &Path,
    account: &ServiceAccount,
    server: &str,
) -> anyhow::Result<()> {
    let ca = std::fs::read(&account.root_ca_file).with_context(|| {
        format!("could not read root CA {}", account.root_ca_file.display())
    })?;
    let token = std::fs::read_to_string(&account.token_file).with_context(|| {
        format!("could not read k8s token {}", account.token_file.display())
    })?;

    let config = KubeConfig {
        api_version: "v1",
        kind: "Config",
        current_context: KUBECONFIG_ENTRY,
        clusters: vec![NamedCluster {
            name: KUBECONFIG_ENTRY,
            cluster: ClusterEntry {
                certificate_authority_data: STANDARD.encode(ca),
                server: server.to_string(),
            },
        }],
        contexts: vec![NamedContext {
            name: KUBECONFIG_ENTRY,
            context: ContextEntry {
                cluster: KUBECONFIG_ENTRY,
                user: KUBECONFIG_ENTRY,
            },
        }],
        users: vec![NamedUser {
            name: KUBECONFIG_ENTRY,
            user: UserEntry { token },
        }],
    };

    let out = serde_yaml::to_string(&config).context("could not marshal kubeconfig")?;
    std::fs::write(path, out)
        .with_context(|| format!("could not write kubeconfig to {}", path.display()))?;
    info!(path = %path.display(), %server, "kubeconfig written");
    Ok(())
}

// ── Scheduler configuration ───────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KubeSchedulerConfiguration {
    api_version: &'static str,
    kind: &'static str,
    scheduler_name: String,
    client_connection: ClientConnection,
    leader_election: LeaderElection,
    plugins: Plugins,
}

#[derive(Debug, Serialize)]
struct ClientConnection {
    kubeconfig: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeaderElection {
    leader_elect: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Plugins {
    pre_filter: PluginSet,
    filter: PluginSet,
}

#[derive(Debug, Serialize)]
struct PluginSet {
    enabled: Vec<PluginRef>,
}

#[derive(Debug, Serialize)]
struct PluginRef {
    name: String,
}

impl PluginSet {
    fn only(name: &str) -> Self {
        Self {
            enabled: vec![PluginRef {
                name: name.to_string(),
            }],
        }
    }
}

/// Write the host scheduler configuration enabling the zonal predicate.
pub fn write_scheduler_config(
    path: &Path,
    config: &SchedulerConfig,
    kubeconfig_path: &Path,
) -> anyhow::Result<()> {
    let scheduler = KubeSchedulerConfiguration {
        api_version: "kubescheduler.config.k8s.io/v1alpha1",
        kind: "KubeSchedulerConfiguration",
        scheduler_name: config.scheduler_name.clone(),
        client_connection: ClientConnection {
            kubeconfig: kubeconfig_path.display().to_string(),
        },
        leader_election: LeaderElection {
            leader_elect: config.leader_elect,
        },
        plugins: Plugins {
            pre_filter: PluginSet::only(&config.plugin_name),
            filter: PluginSet::only(&config.plugin_name),
        },
    };

    let out = serde_yaml::to_string(&scheduler).context("could not marshal scheduler config")?;
    std::fs::write(path, out)
        .with_context(|| format!("could not write scheduler config to {}", path.display()))?;
    info!(
        path = %path.display(),
        scheduler = %config.scheduler_name,
        plugin = %config.plugin_name,
        "scheduler config written"
    );
    Ok(())
}
