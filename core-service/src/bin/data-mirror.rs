//! Data mirror daemon
//!
//! Run with: data-mirror --config mirror.json
//!
//! The config file holds the same attribute map a resource host would pass
//! (`app_api_key`, `app_api_key_id`, `dataset_id`, `tags`, ...). On Unix,
//! `SIGHUP` re-reads the file and reconfigures the running loop.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bridge_traits::logging::LogLevel;
use clap::Parser;
use core_runtime::config::read_attributes_file;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::MirrorHost;
use serde_json::{Map, Value};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "data-mirror")]
#[command(version, about = "Mirror a filtered view of the remote data catalog into a local directory")]
struct Args {
    /// JSON file with the mirror attributes
    #[arg(short, long, env = "DATA_MIRROR_CONFIG")]
    config: PathBuf,

    /// Log output format (pretty, json, compact)
    #[arg(long, env = "DATA_MIRROR_LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,

    /// Log level for the mirror crates
    #[arg(long, env = "DATA_MIRROR_LOG_LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Full filter directive, overrides --log-level
    #[arg(long, env = "RUST_LOG")]
    log_filter: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logging = LoggingConfig::default()
        .with_format(args.log_format)
        .with_level(args.log_level);
    if let Some(filter) = &args.log_filter {
        logging = logging.with_filter(filter.clone());
    }
    init_logging(logging).context("failed to initialise logging")?;

    let runtime = core_async::runtime::build_multi_thread().context("failed to start runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: Args) -> Result<()> {
    let attributes = read_attributes(&args.config)?;
    let host = core_service::bootstrap_desktop(&attributes)
        .await
        .context("failed to start mirror")?;
    info!(config = %args.config.display(), "Data mirror running");

    let result = wait_for_shutdown(&host, &args.config).await;
    host.shutdown().await;
    info!("Data mirror stopped");
    result
}

fn read_attributes(path: &Path) -> Result<Map<String, Value>> {
    read_attributes_file(path).context("failed to load mirror attributes")
}

#[cfg(unix)]
async fn reload(host: &MirrorHost, path: &Path) {
    let attributes = match read_attributes(path) {
        Ok(attributes) => attributes,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Reload failed; keeping current configuration");
            return;
        }
    };

    match host.reconfigure(&attributes).await {
        Ok(()) => info!("Configuration reloaded"),
        Err(e) => error!(error = %e, "Reload rejected; keeping current configuration"),
    }
}

#[cfg(unix)]
async fn wait_for_shutdown(host: &MirrorHost, path: &Path) -> Result<()> {
    use core_async::signal::{ctrl_c, signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).context("failed to install SIGHUP handler")?;

    loop {
        core_async::select! {
            result = ctrl_c() => {
                result.context("failed to listen for Ctrl-C")?;
                info!("Shutdown requested");
                return Ok(());
            }
            Some(()) = hangup.recv() => {
                info!("SIGHUP received, reloading configuration");
                reload(host, path).await;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown(_host: &MirrorHost, _path: &Path) -> Result<()> {
    core_async::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("Shutdown requested");
    Ok(())
}
