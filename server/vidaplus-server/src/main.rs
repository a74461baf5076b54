use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use logger_redacted::{init_tracing, LoggerConfig};
use tracing::{info, warn};

use vidaplus_server::{create_app, ServerConfig, VidaPlusServer};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    let _ = dotenvy::dotenv();
    let config = ServerConfig::parse();

    init_tracing(
        &LoggerConfig::for_target("vidaplus_server", config.verbose)
            .with_format(config.environment.log_format()),
    )
    .context("Failed to initialize logging")?;

    print_startup_banner();
    let addr = config.bind_address()?;
    info!(?config, "Starting VidaPlus server");
    if config.enable_dev_endpoints {
        warn!("Development endpoints are enabled; /api/v1/dev/recreate-db drops all data");
    }

    let server = VidaPlusServer::new(config).await?;
    let app = create_app(server);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("🚀 {}", format!("VidaPlus server running on http://{addr}").bright_green());
    info!("📋 {}", format!("Health check: http://{addr}/api/v1/health").bright_blue());
    info!("📖 {}", format!("API docs: http://{addr}/docs").bright_blue());

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "Failed to listen for the shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn print_startup_banner() {
    println!("{}", "╔══════════════════════════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║                      🏥 VIDAPLUS HEALTH                      ║".bright_cyan());
    println!("{}", "║               Hospital Management Services API               ║".bright_cyan());
    println!("{}", "╚══════════════════════════════════════════════════════════════╝".bright_cyan());
    println!();
}
