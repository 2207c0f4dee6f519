use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};

const DEFAULT_BIND: &str = "0.0.0.0:8000";

#[derive(Debug, Parser)]
#[command(name = "academy")]
#[command(author, version, about = "Course catalog and progress tracking API", long_about = None)]
pub struct Cli {
    /// SQLite connection URL
    #[arg(
        long = "db",
        env = "ACADEMY_DB_URL",
        default_value = "sqlite:academy.sqlite3?mode=rwc",
        global = true
    )]
    pub db_url: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Address to listen on
        #[arg(long, env = "ACADEMY_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,
    },
    /// Create or upgrade the database schema, then exit
    Migrate,
    /// Load the starter catalog and an administrator account
    Seed {
        #[arg(long, env = "ACADEMY_ADMIN_EMAIL", default_value = "admin@example.com")]
        admin_email: String,

        #[arg(long, env = "ACADEMY_ADMIN_PASSWORD")]
        admin_password: String,

        #[arg(long, env = "ACADEMY_ADMIN_NAME", default_value = "Administrator")]
        admin_name: String,
    },
}

impl Cli {
    /// The subcommand to run; `serve` when omitted.
    pub fn into_command(self) -> anyhow::Result<Command> {
        if let Some(command) = self.command {
            return Ok(command);
        }
        let bind = std::env::var("ACADEMY_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.to_owned())
            .parse()
            .context("invalid ACADEMY_BIND address")?;
        Ok(Command::Serve { bind })
    }
}

/// Create the parent directory of a file-backed SQLite URL so the driver
/// can create the database file itself.
pub fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_file_path(db_url) else {
        return Ok(());
    };
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create database directory {}", parent.display()))?;
    }
    Ok(())
}

fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" || path.starts_with("file:") {
        return None;
    }
    Some(path)
}
