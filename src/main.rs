//! # Main — CLI Entry Point
//!
//! Routes CLI subcommands to the HTTP server and the migrations runner.
//! Handles the shared concerns: `.env` loading, structured logging, and the
//! database connection settings.
//!
//! ## Subcommands
//!
//! - `serve` — run the profile API (default port 8000, `--port`/`PORT`).
//! - `migrate` — apply the SQL files in `migrations/` and exit.
//!
//! ## Configuration
//!
//! - `--database-url` / `DATABASE_URL`: full connection URL; wins when set.
//! - `DB_HOST` / `DB_PORT` / `DB_USER` / `DB_PASSWORD` / `DB_NAME`: discrete
//!   settings used when no URL is configured.
//! - `POOL_MAX_CONNECTIONS`: connection pool ceiling (default 5).
//! - `LOG_FORMAT=json`: JSON log output for container platforms.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vynos::{api, db};

#[derive(Parser)]
#[command(name = "vynos", about = "Profile API for the Vynos VK Mini App")]
struct Cli {
    /// PostgreSQL connection URL; overrides the discrete DB_* settings
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Database host (used when --database-url is not set)
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    db_port: u16,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "postgres")]
    db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD")]
    db_password: Option<String>,

    /// Database name
    #[arg(long, env = "DB_NAME", default_value = "vynos")]
    db_name: String,

    /// Connection pool ceiling
    #[arg(long, env = "POOL_MAX_CONNECTIONS", default_value_t = 5)]
    pool_max_connections: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 8000)]
        port: u16,
    },
    /// Apply SQL migrations and exit
    Migrate {
        /// Directory containing the .sql files
        #[arg(long, default_value = "migrations")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize structured logging: LOG_FORMAT=json for containers, human-readable otherwise
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt().json().with_target(false).init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let settings = db::ConnectSettings {
        database_url: cli.database_url.clone(),
        host: cli.db_host.clone(),
        port: cli.db_port,
        user: cli.db_user.clone(),
        password: cli.db_password.clone(),
        database: cli.db_name.clone(),
        max_connections: cli.pool_max_connections,
    };

    let rt = tokio::runtime::Runtime::new()?;
    match &cli.command {
        Commands::Serve { port } => rt.block_on(api::run(*port, &settings)),
        Commands::Migrate { dir } => rt.block_on(async {
            let database = db::Database::connect(&settings).await?;
            database.migrate(dir).await?;
            tracing::info!(dir = %dir.display(), "migrations applied");
            Ok(())
        }),
    }
}
