//! # taxi-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the taxi fleet API.
//! Binds to a configurable host and port (default `0.0.0.0:8080`).

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use metrics_exporter_prometheus::PrometheusBuilder;
use taxi_api::state::AppConfig;
use taxi_core::PasswordCost;

/// Taxi fleet API server.
#[derive(Parser, Debug)]
#[command(name = "taxi-api", version, about)]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: std::net::IpAddr,

    /// YAML fixture file seeding manufacturers, cars and drivers at startup.
    #[arg(long, env = "TAXI_FIXTURES")]
    fixtures: Option<PathBuf>,

    /// Log output format.
    #[arg(long, env = "TAXI_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Do not install the Prometheus recorder; `/metrics` answers 404.
    #[arg(long, env = "TAXI_METRICS_DISABLED")]
    no_metrics: bool,

    /// Argon2 memory cost in KiB for new password hashes.
    #[arg(long, env = "TAXI_PASSWORD_MEMORY_KIB")]
    password_memory_kib: Option<u32>,

    /// Argon2 passes for new password hashes.
    #[arg(long, env = "TAXI_PASSWORD_ITERATIONS")]
    password_iterations: Option<u32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize structured tracing.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match args.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }

    let defaults = PasswordCost::default();
    let config = AppConfig {
        password_cost: PasswordCost {
            memory_kib: args.password_memory_kib.unwrap_or(defaults.memory_kib),
            iterations: args.password_iterations.unwrap_or(defaults.iterations),
        },
    };

    let state = taxi_api::bootstrap::bootstrap(config, args.fixtures.as_deref())
        .context("bootstrap failed")?;

    let state = if args.no_metrics {
        tracing::info!("Prometheus recorder disabled");
        state
    } else {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("failed to install Prometheus recorder")?;
        state.with_metrics(handle)
    };

    let app = taxi_api::app(state);

    let addr = SocketAddr::new(args.host, args.port);
    tracing::info!("taxi API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
