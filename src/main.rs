use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use relayq::{QueueRegistry, RespConfig, RespServer};

#[derive(Parser, Debug)]
#[command(name = "relayq")]
#[command(about = "In-memory named FIFO queue server", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "RELAYQ_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "RELAYQ_PORT", default_value_t = 6379)]
    port: u16,

    /// Log output format
    #[arg(long, env = "RELAYQ_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_format)?;

    info!("relayq v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = RespConfig {
        host: cli.host,
        port: cli.port,
    };
    let addr = format!("{}:{}", config.host, config.port);

    let registry = Arc::new(QueueRegistry::new());
    let server = RespServer::bind(config, registry)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    server.run_until(shutdown_signal()).await?;

    info!("Shutdown complete.");
    Ok(())
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("relayq=info"))
        .context("failed to create env filter")?;

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).compact())
            .init(),
    }

    Ok(())
}

/// Resolves on ctrl-c, or on SIGTERM, SIGHUP or SIGQUIT where available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        if let Err(e) = unix_termination().await {
            tracing::warn!(error = %e, "Failed to listen for termination signals");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("Shutdown signal received. Exiting gracefully...");
}

#[cfg(unix)]
async fn unix_termination() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    let mut quit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = terminate.recv() => {}
        _ = hangup.recv() => {}
        _ = quit.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn unix_termination() -> std::io::Result<()> {
    std::future::pending().await
}
