mod config;
mod seed;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use services::{AppServices, Clock};
use storage::repository::Storage;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Cli, Command, prepare_sqlite_file};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let db_url = cli.db_url.clone();
    let command = cli.into_command()?;
    prepare_sqlite_file(&db_url)?;

    match command {
        Command::Serve { bind } => serve(&db_url, bind).await,
        Command::Migrate => {
            Storage::sqlite(&db_url)
                .await
                .with_context(|| format!("migrate {db_url}"))?;
            info!(db = %db_url, "database schema is up to date");
            Ok(())
        }
        Command::Seed {
            admin_email,
            admin_password,
            admin_name,
        } => {
            let services = open_services(&db_url).await?;
            let report = seed::run(&services, &admin_name, &admin_email, &admin_password).await?;
            info!(
                admin_created = report.admin_created,
                modules = report.modules_created,
                lessons = report.lessons_created,
                "seed finished"
            );
            Ok(())
        }
    }
}

async fn open_services(db_url: &str) -> Result<AppServices> {
    AppServices::new_sqlite(db_url, Clock::default())
        .await
        .with_context(|| format!("open database {db_url}"))
}

async fn serve(db_url: &str, bind: SocketAddr) -> Result<()> {
    info!("Initializing services...");
    let services = open_services(db_url).await?;
    let app = api::router(services);

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    info!("Server running on {bind}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                warn!(error = %err, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                warn!(error = %err, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
