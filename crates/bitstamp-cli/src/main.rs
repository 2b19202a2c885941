/*
[INPUT]:  CLI arguments, optional YAML configuration file, OS shutdown signals
[OUTPUT]: JSON results on stdout or a live frame stream with graceful shutdown
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use anyhow::{Context, Result, anyhow};
use bitstamp_adapter::BitstampClient;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bitstamp_cli::commands::{self, Command};
use bitstamp_cli::BitstampConfig;

#[derive(Parser, Debug)]
#[command(name = "bitstamp", version, about = "Bitstamp REST and WebSocket client")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[arg(long = "dry-run")]
    dry_run: bool,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(
        command = args.command.name(),
        config_path = ?args.config_path,
        dry_run = args.dry_run,
        "starting bitstamp"
    );

    let config = load_config(args.config_path.as_ref())?;
    config.validate().context("validate config")?;
    args.command.validate().context("validate arguments")?;

    let credentials = if args.command.requires_credentials() {
        Some(config.credentials().context("resolve credentials")?)
    } else {
        None
    };

    if args.dry_run {
        info!("dry-run requested; configuration and arguments validated");
        return Ok(());
    }

    if let Command::Stream {
        channels,
        reconnect,
    } = &args.command
    {
        let shutdown = CancellationToken::new();
        setup_signal_handlers(shutdown.clone());
        let state = commands::stream(config.ws_config(), channels.clone(), *reconnect, shutdown).await?;
        info!(?state, "stream shutdown complete");
        return Ok(());
    }

    let mut client =
        BitstampClient::with_config(config.client_config()).context("build REST client")?;
    if let Some(credentials) = credentials {
        client = client.with_credentials(credentials);
    }

    let value = args
        .command
        .execute(&client)
        .await
        .with_context(|| format!("{} failed", args.command.name()))?;
    println!("{}", commands::render(&value)?);
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<BitstampConfig> {
    let Some(path) = path else {
        return Ok(BitstampConfig::default());
    };
    let path_str = path
        .to_str()
        .context("config path must be valid utf-8")?;
    BitstampConfig::from_file(path_str).context("load config")
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
