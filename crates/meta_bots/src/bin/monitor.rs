//! exchange quote monitor
//!
//! Forks every network listed in the token sheet, measures a two-way swap of each token at the
//! base size and at ten times that size, and appends one row per token to the network's sheet.

use anyhow::Context;
use gumdrop::Options;
use meta_alchemy::ChainSession;
use meta_bots::{
    batch::{BatchDriver, LogSink},
    network_endpoints, MonitorConfig,
};
use meta_integration::{GoogleSheets, ResultSink, Secrets, TokenSource};
use meta_tracing::init_tracing;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, Options)]
struct Opts {
    help: bool,

    #[options(help = "directory with default.toml and its overrides", default = "config/monitor")]
    config_dir: String,

    #[options(help = "only process this network, such as Polygon (repeatable)")]
    network: Vec<String>,

    #[options(help = "log the rows instead of appending them to the sheet")]
    dry_run: bool,
}

async fn run(opts: Opts, config: MonitorConfig) -> anyhow::Result<()> {
    let secrets = Secrets::load(&config.secrets).await.context("loading secrets")?;
    let sheets = Arc::new(
        GoogleSheets::from_secrets(&secrets, config.sheets.clone())
            .context("initialising google sheets")?,
    );

    let endpoints = network_endpoints(&secrets);
    info!("upstream endpoints for {:?}", endpoints.keys().collect::<Vec<_>>());
    let session = ChainSession::connect(&config.simulator, endpoints).context("connecting to node")?;

    let mut lists = sheets.token_lists().await.context("reading token lists")?;
    if !opts.network.is_empty() {
        lists.retain(|l| opts.network.iter().any(|n| n.eq_ignore_ascii_case(&l.network)));
    }
    info!("networks to process: {}", lists.len());

    let sink: Arc<dyn ResultSink> = if opts.dry_run { Arc::new(LogSink) } else { sheets };
    let summary = BatchDriver::new(session, sink).run(&lists).await;
    info!(
        "completed {:?}, skipped {:?}, failed {:?}",
        summary.completed, summary.skipped, summary.failed
    );

    if !summary.is_success() {
        anyhow::bail!("{} of {} networks failed", summary.failed.len(), lists.len());
    }
    Ok(())
}

async fn main_impl() -> anyhow::Result<()> {
    let opts = Opts::parse_args_default_or_exit();
    let config = MonitorConfig::try_new(&opts.config_dir).context("parsing config")?;
    let _guards = init_tracing(config.log.clone().into());
    info!("opts: {:?}, simulator: {:?}", opts, config.simulator);

    run(opts, config).await.map_err(|e| {
        error!("run error: {:#}", e);
        e
    })
}

#[tokio::main]
async fn main() {
    match main_impl().await {
        Ok(_) => {
            std::process::exit(exitcode::OK);
        }
        Err(e) => {
            eprintln!("run Error: {:#}", e);
            std::process::exit(exitcode::DATAERR);
        }
    }
}
