//! SQLite-backed storage for the project register.
//!
//! A [`Database`] wraps a connection pool and brings the schema up to date
//! when opened. Repositories take a clone of the pool handle; they never
//! open connections themselves.

use crate::storage::migrations;
use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DEFAULT_POOL_SIZE: u32 = 5;

/// Where and how to open the register database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite file, or `:memory:`.
    pub path: PathBuf,
    /// Connection pool size.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: DEFAULT_POOL_SIZE,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a database file at `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Configuration for a throwaway in-memory database.
    ///
    /// Each SQLite connection gets its own private in-memory database, so the
    /// pool is capped at one connection to keep every query on the same one.
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            max_connections: 1,
        }
    }

    /// Set the connection pool size.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    fn is_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }
}

/// Database location used when neither the CLI nor the config file names one.
pub fn default_database_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("pms").join("pms.db"))
        .unwrap_or_else(|| PathBuf::from("pms.db"))
}

/// An open register database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    path: PathBuf,
}

impl Database {
    /// Open (creating if necessary) the database described by `config` and
    /// apply any pending schema migrations.
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        if !config.is_memory() {
            // parent() is Some("") for a bare filename like "pms.db"
            if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let options = if config.is_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.path)
                .create_if_missing(true)
        };
        let options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database at {}", config.path.display()))?;

        let db = Self {
            pool,
            path: config.path,
        };
        db.migrate().await?;
        Ok(db)
    }

    /// Open an in-memory database for tests.
    pub async fn in_memory() -> Result<Self> {
        Self::new(DatabaseConfig::in_memory()).await
    }

    /// The pool repositories run their queries on.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Path of the backing file (`:memory:` for in-memory databases).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bring the schema up to the current version.
    pub async fn migrate(&self) -> Result<()> {
        migrations::run_migrations(&self.pool)
            .await
            .context("Schema migration failed")
    }

    /// Report which schema version the database is at.
    pub async fn migration_status(&self) -> Result<migrations::MigrationStatus> {
        migrations::migration_status(&self.pool)
            .await
            .context("Could not read schema version")
    }

    /// Cheap liveness probe used by `pms doctor`.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }
}
