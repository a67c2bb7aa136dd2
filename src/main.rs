//! isilon-disk-exporter - version 0.1.0
//!
//! Prometheus exporter for Isilon/OneFS node disk statistics with tracing logging.
//! This is the main entry point that initializes the server and handles subcommands.

mod cli;
mod commands;
mod config;
mod handlers;
mod state;

use axum::{routing::get, Router};
use clap::Parser;
use isilon_disk_exporter::CollectorRegistry;
use prometheus::{Counter, Gauge, Opts, Registry};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::LevelFilter;

use cli::{Args, Commands};
use commands::{command_collectors, command_config, command_test};
use config::{
    resolve_config, show_config, validate_effective_config, Config, DEFAULT_BIND_ADDR, DEFAULT_PORT,
};
use handlers::{metrics_handler, root_handler};
use state::AppState;

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config) {
    let log_level = match config.log_level.as_deref().unwrap_or("info") {
        "off" => LevelFilter::OFF,
        "error" => LevelFilter::ERROR,
        "warn" => LevelFilter::WARN,
        "debug" => LevelFilter::DEBUG,
        "trace" => LevelFilter::TRACE,
        _ => LevelFilter::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging initialized with level: {}", log_level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format.clone());
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        return match command {
            // Config and Collectors don't need a reachable cluster
            Commands::Config {
                output,
                format,
                commented,
            } => command_config(output.clone(), format.clone(), *commented),

            Commands::Collectors => command_collectors(&resolve_config(&args)?),

            Commands::Test { key } => {
                let config = load_validated_config(&args)?;
                setup_logging(&config);
                command_test(key.clone(), &config).await
            }
        };
    }

    // Load configuration for main server mode
    let config = load_validated_config(&args)?;

    setup_logging(&config);

    info!("Starting isilon-disk-exporter");

    let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
    let port = config.port.unwrap_or(DEFAULT_PORT);

    // Build enabled collectors from the registration table
    let ctx = config.collector_context()?;
    let collectors = CollectorRegistry::builtin().build(&ctx, &config.collector_overrides())?;
    if collectors.is_empty() {
        warn!("No collectors enabled - /metrics will only expose exporter metrics");
    }
    for c in &collectors {
        info!("Enabled collector: {}", c.name);
    }

    // Initialize Prometheus registry for exporter metrics
    let registry = Registry::new();
    debug!("Prometheus registry initialized");

    let scrape_duration = Gauge::with_opts(
        Opts::new(
            "exporter_scrape_duration_seconds",
            "Time spent serving the previous /metrics request",
        )
        .namespace(config.namespace()),
    )?;
    let scrapes_total = Counter::with_opts(
        Opts::new(
            "exporter_scrapes_total",
            "Number of /metrics requests served",
        )
        .namespace(config.namespace()),
    )?;

    registry.register(Box::new(scrape_duration.clone()))?;
    registry.register(Box::new(scrapes_total.clone()))?;

    debug!("All metrics registered successfully");

    let state = Arc::new(AppState {
        registry,
        scrape_duration,
        scrapes_total,
        collectors,
        config: Arc::new(config.clone()),
        start_time: Instant::now(),
    });

    // Setup graceful shutdown signal handlers
    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    };

    // Configure HTTP server routes
    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state.clone());

    let listener = TcpListener::bind(addr).await?;
    info!(
        "isilon-disk-exporter listening on http://{}:{}",
        bind_ip_str, port
    );

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal => {
            info!("Shutdown signal received, exiting...");
        }
    }

    info!("isilon-disk-exporter stopped gracefully");
    Ok(())
}
