use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use changelog_sync::config::Config;
use changelog_sync::server::{AppState, build_router};
use changelog_sync::sync::SyncOrchestrator;
use changelog_sync::webhooks::ChangelogDetector;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "changelog-sync", version, about = "Sync the changelog to GitBook")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the webhook server.
    Serve,
    /// Run one sync in the foreground and exit.
    Sync,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "changelog_sync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    let orchestrator = SyncOrchestrator::from_config(&config)
        .context("failed to build GitBook client")?;

    match cli.command {
        Command::Serve => serve(&config, orchestrator).await,
        Command::Sync => {
            let outcome = orchestrator.run().await;
            if !outcome.is_success() {
                anyhow::bail!("{}", outcome.message());
            }
            Ok(())
        }
    }
}

async fn serve(config: &Config, orchestrator: SyncOrchestrator) -> anyhow::Result<()> {
    let secret = config.require_webhook_secret()?;
    let state = AppState::new(
        secret.as_bytes(),
        config.primary_branch_ref.clone(),
        Arc::new(ChangelogDetector::default()),
        Arc::new(orchestrator),
    );
    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let tracker = state.tracker();
    tracker.close();
    tracing::info!(in_flight = tracker.len(), "waiting for sync runs to finish");
    tracker.wait().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
