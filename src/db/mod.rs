//! # Database — PostgreSQL Storage Layer
//!
//! Async storage operations for user profiles and saved addresses via
//! `sqlx::PgPool`.
//!
//! ## Schema
//!
//! - `users`: one row per VK account, keyed by the unique `vk_id`
//! - `addresses`: saved pickup addresses, owned by a user row
//!
//! ## Module Structure
//!
//! Operations are split into submodules by domain:
//!
//! - [`users`] — login upsert, profile save, lookup, contact updates
//! - [`addresses`] — address list/create/delete
//!
//! All writes go through single statements; the login path in particular is
//! one `INSERT ... ON CONFLICT DO UPDATE`, so concurrent first logins for the
//! same `vk_id` cannot create duplicate rows.

pub mod addresses;
mod users;

use anyhow::Result;
use serde::Serialize;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::path::{Path, PathBuf};

// ── User types ──────────────────────────────────────────────────

/// Profile row from the `users` table.
///
/// `phone` and `email` stay `NULL` until the user fills them in; the login
/// upsert never touches them.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub vk_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub photo_100: Option<String>,
    pub photo_200: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// ── Connection settings ─────────────────────────────────────────

/// Connection settings resolved from CLI flags and environment variables.
///
/// `database_url`, when set, wins over the discrete fields. The discrete
/// fields mirror the `DB_*` variables the deployment compose file exports.
#[derive(Clone)]
pub struct ConnectSettings {
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub max_connections: u32,
}

impl ConnectSettings {
    /// Settings carrying just a URL. The discrete fields are placeholders;
    /// they are never consulted when a URL is present.
    pub fn from_url(url: &str) -> Self {
        ConnectSettings {
            database_url: Some(url.to_string()),
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: None,
            database: String::new(),
            max_connections: 5,
        }
    }
}

// ── Database struct and connection ──────────────────────────────

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and build the shared connection pool.
    ///
    /// When no `DATABASE_URL` is configured, the discrete settings compose
    /// `PgConnectOptions` directly, so passwords never need URL escaping.
    pub async fn connect(settings: &ConnectSettings) -> Result<Self> {
        let opts = match settings.database_url.as_deref() {
            Some(url) => url.parse::<PgConnectOptions>()?,
            None => {
                let mut opts = PgConnectOptions::new()
                    .host(&settings.host)
                    .port(settings.port)
                    .username(&settings.user)
                    .database(&settings.database);
                if let Some(ref pw) = settings.password {
                    opts = opts.password(pw);
                }
                opts
            }
        };
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(opts)
            .await?;
        Ok(Database { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the `.sql` files under `dir` in filename order.
    ///
    /// The DDL uses `IF NOT EXISTS` guards throughout, so reapplying against
    /// an existing database is harmless.
    pub async fn migrate(&self, dir: &Path) -> Result<()> {
        for path in migration_files(dir)? {
            let sql = std::fs::read_to_string(&path)?;
            sqlx::raw_sql(&sql).execute(&self.pool).await?;
            tracing::info!(file = %path.display(), "applied migration");
        }
        Ok(())
    }

    /// Health check: execute `SELECT 1` to verify database connectivity.
    ///
    /// Used by the `/readyz` readiness probe. Returns `Ok(())` if the
    /// database responds, or an error if the connection is broken.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

/// List the `.sql` files under `dir`, sorted by filename.
fn migration_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("Cannot read migrations dir {}: {}", dir.display(), e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    files.sort();
    Ok(files)
}

// ── Tests ───────────────────────────────────────────────────────
