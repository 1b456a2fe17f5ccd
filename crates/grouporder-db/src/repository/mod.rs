//! # Repository Module
//!
//! Database repository implementations for Group Order.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service operation                                                     │
//! │       │                                                                 │
//! │       │  db.orders().get_by_id(&order_id)                              │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── create(&self, created_by, draft)                                  │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list_open / list_history_for_user                                 │
//! │  └── update_status(&self, id, from, to)                                │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Repositories map rows to grouporder-core types and nothing more.      │
//! │  Rules (who may do what, cap checks) live in grouporder-service.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`OrderRepository`](order::OrderRepository) - Orders and menus
//! - [`LineItemRepository`](line_item::LineItemRepository) - Participant line items
//! - [`ProfileRepository`](profile::ProfileRepository) - User display names

pub mod line_item;
pub mod order;
pub mod profile;
