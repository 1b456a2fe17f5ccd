//! # grouporder-db: Database Layer for Group Order
//!
//! Persistence for orders, menus, participant line items and profiles.
//! SQLite through sqlx, with embedded migrations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Group Order Data Flow                             │
//! │                                                                         │
//! │  grouporder-service (join_order, close_order, ...)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  grouporder-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ OrderRepo     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ LineItemRepo  │    │ 001_init.sql │  │   │
//! │  │   │ WAL + FKs     │    │ ProfileRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (GROUPORDER_DATABASE_PATH) or :memory: in tests           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use grouporder_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("grouporder.db")).await?;
//!
//! if let Some(order) = db.orders().get_by_id(&order_id).await? {
//!     let summary = grouporder_core::compute_summary(&order);
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig, DbLocation};

// Repository re-exports for convenience
pub use repository::line_item::LineItemRepository;
pub use repository::order::OrderRepository;
pub use repository::profile::{Profile, ProfileRepository};
