//! # Database Pool Management
//!
//! Opening the SQLite pool and handing out repositories.
//!
//! ## Connection Settings
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Every pooled connection gets                         │
//! │                                                                         │
//! │  PRAGMA journal_mode = WAL     order pages keep reading while a        │
//! │                                participant's upsert commits            │
//! │  PRAGMA synchronous  = NORMAL  safe with WAL, far fewer fsyncs         │
//! │  PRAGMA foreign_keys = ON      line items/menus cascade with orders    │
//! │  busy_timeout        = 5s      concurrent joins wait instead of        │
//! │                                failing with SQLITE_BUSY                │
//! │                                                                         │
//! │  DbLocation::File(path)  → created on first open                       │
//! │  DbLocation::Memory      → private database per pool (tests)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations::{self, MigrationStatus};
use crate::repository::line_item::LineItemRepository;
use crate::repository::order::OrderRepository;
use crate::repository::profile::ProfileRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// A file on disk, created if missing.
    File(PathBuf),
    /// A throwaway database that disappears with the pool.
    Memory,
}

impl fmt::Display for DbLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbLocation::File(path) => write!(f, "{}", path.display()),
            DbLocation::Memory => f.write_str(":memory:"),
        }
    }
}

/// Database configuration.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/grouporder/grouporder.db").max_connections(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: DbLocation,

    /// Upper bound on pooled connections. Default: 5
    pub max_connections: u32,

    /// How long to wait for a free connection. Default: 30 seconds
    pub acquire_timeout: Duration,

    /// How long a statement waits on a locked database. Default: 5 seconds
    pub busy_timeout: Duration,

    /// Apply pending migrations when the pool opens. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed configuration with defaults.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: DbLocation::File(path.into()),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// In-memory configuration for tests.
    ///
    /// Each pool gets its own empty database, which lives only as long as
    /// the pool's single connection.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = match &self.location {
            DbLocation::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            // WAL needs a file; in-memory databases keep their own journal.
            // sqlx names each parsed in-memory URL uniquely.
            DbLocation::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?,
        };

        Ok(options
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the pool; hands out repositories.
///
/// Cheap to clone. Passed explicitly to every service operation.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(location = %config.location, "Opening database");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };

        if config.run_migrations {
            migrations::run_migrations(&db.pool).await?;
        }

        info!(
            location = %config.location,
            max_connections = config.max_connections,
            "Database ready"
        );
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn profiles(&self) -> ProfileRepository {
        ProfileRepository::new(self.pool.clone())
    }

    /// ```rust,ignore
    /// let order = db.orders().get_by_id(&order_id).await?;
    /// ```
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    pub fn line_items(&self) -> LineItemRepository {
        LineItemRepository::new(self.pool.clone())
    }

    /// Applied vs embedded migrations.
    pub async fn migration_status(&self) -> DbResult<MigrationStatus> {
        migrations::migration_status(&self.pool).await
    }

    /// `true` if a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
