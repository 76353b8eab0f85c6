//! zonald: companion binary for the zonal distribution predicate.
//!
//! - `bootstrap` writes the in-cluster kubeconfig and scheduler configuration
//!   a custom scheduler container starts from
//! - `evaluate` runs one scheduling cycle for a pod against a cluster snapshot
//! - `topology` prints the zonal topology a workload's replicas are spread over
//!
//! # Usage
//!
//! ```text
//! zonald bootstrap --kubeconfig /kubeconfig --scheduler-config /scheduler-config
//! zonald evaluate --snapshot cluster.json db/crdb-3
//! zonald topology --snapshot cluster.json db/crdb
//! ```

mod bootstrap;
mod evaluate;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use zonal_core::SchedulerConfig;

use crate::bootstrap::{ServiceAccount, api_server_url};
use crate::evaluate::OutputFormat;

#[derive(Parser)]
#[command(name = "zonald", about = "Zonal distribution scheduler tooling")]
struct Cli {
    /// Scheduler configuration file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Write the in-cluster kubeconfig and scheduler configuration.
    Bootstrap {
        /// Where to write the kubeconfig.
        #[arg(long, default_value = "/kubeconfig")]
        kubeconfig: PathBuf,

        /// Where to write the scheduler configuration.
        #[arg(long, default_value = "/scheduler-config")]
        scheduler_config: PathBuf,

        /// Service account token file.
        #[arg(long, default_value = bootstrap::DEFAULT_TOKEN_FILE)]
        token_file: PathBuf,

        /// Service account root CA file.
        #[arg(long, default_value = bootstrap::DEFAULT_ROOT_CA_FILE)]
        root_ca_file: PathBuf,
    },

    /// Run one scheduling cycle for a pod (`namespace/name`).
    Evaluate {
        /// JSON cluster snapshot.
        #[arg(long)]
        snapshot: PathBuf,

        #[arg(long, value_enum, default_value = "text")]
        output: OutputFormat,

        pod: String,
    },

    /// Show the zonal topology of a workload (`namespace/name`).
    Topology {
        /// JSON cluster snapshot.
        #[arg(long)]
        snapshot: PathBuf,

        #[arg(long, value_enum, default_value = "text")]
        output: OutputFormat,

        workload: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Bootstrap {
            kubeconfig,
            scheduler_config,
            token_file,
            root_ca_file,
        } => {
            let account = ServiceAccount {
                token_file,
                root_ca_file,
            };
            run_bootstrap(&config, &account, &kubeconfig, &scheduler_config)
        }
        Command::Evaluate {
            snapshot,
            output,
            pod,
        } => evaluate::run_evaluate(config, &snapshot, &pod, output).await,
        Command::Topology {
            snapshot,
            output,
            workload,
        } => evaluate::run_topology(&config, &snapshot, &workload, output),
    }
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,zonald=debug,zonal=debug"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SchedulerConfig> {
    match path {
        Some(path) => {
            let config = SchedulerConfig::from_file(path)?;
            info!(path = %path.display(), scheduler = %config.scheduler_name, "configuration loaded");
            Ok(config)
        }
        None => Ok(SchedulerConfig::default()),
    }
}

fn run_bootstrap(
    config: &SchedulerConfig,
    account: &ServiceAccount,
    kubeconfig: &Path,
    scheduler_config: &Path,
) -> anyhow::Result<()> {
    let host = std::env::var("KUBERNETES_SERVICE_HOST")
        .context("KUBERNETES_SERVICE_HOST is not set; bootstrap must run inside the cluster")?;
    let port = std::env::var("KUBERNETES_SERVICE_PORT")
        .context("KUBERNETES_SERVICE_PORT is not set; bootstrap must run inside the cluster")?;
    let server = api_server_url(&host, &port);

    bootstrap::write_in_cluster_kubeconfig(kubeconfig, account, &server)?;
    bootstrap::write_scheduler_config(scheduler_config, config, kubeconfig)?;
    Ok(())
}
