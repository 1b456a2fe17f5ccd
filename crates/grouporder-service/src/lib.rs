//! # grouporder-service: Order Lifecycle and Join Flow
//!
//! The in-process API for Group Order. An outer surface (HTTP handler,
//! RPC, CLI) authenticates the caller, builds a [`Principal`], and calls
//! the functions here with an explicit [`Database`] handle.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Outer surface ──► Principal { user_id, display_name }                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             grouporder-service (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   orders          participation          config / telemetry    │   │
//! │  │   create_order    preview_join           ServiceConfig::load   │   │
//! │  │   get_order       join_order             init_tracing          │   │
//! │  │   list_*          update_line_item_*                           │   │
//! │  │   close / cancel  set / toggle payment                         │   │
//! │  └───────────┬───────────────────────────────────┬─────────────────┘   │
//! │              │                                   │                     │
//! │              ▼                                   ▼                     │
//! │      grouporder-core                      grouporder-db                │
//! │      (summary, preview, cap check)        (repositories)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use grouporder_service::{config::ServiceConfig, participation, telemetry};
//! use grouporder_db::Database;
//!
//! let config = ServiceConfig::load()?;
//! telemetry::init_tracing(&config)?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let actor = Principal::new(user_id).with_display_name("Alice");
//! let request = participation::JoinRequest::new("Nasi Goreng", 2);
//! let line_item = participation::join_order(&db, &actor, &order_id, &request).await?;
//! ```

pub mod config;
pub mod error;
pub mod orders;
pub mod participation;
pub mod telemetry;

pub use config::{ConfigError, ServiceConfig};
pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use orders::{OrderDetail, OrderOverview};
pub use participation::JoinRequest;

pub use grouporder_core::Principal;
pub use grouporder_db::Database;
