//! # Database Error Types
//!
//! ```text
//! sqlx::Error ──► DbError (this module) ──► ServiceError (grouporder-service)
//!                 constraint failures are      codes + safe messages,
//!                 classified, the rest kept    internals only logged
//!                 as text for logging
//! ```

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A row addressed by id doesn't exist, or a conditional update matched
    /// nothing (e.g. the order left OPEN in the meantime).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// UNIQUE violation not absorbed by an upsert, e.g. two menu items with
    /// the same name.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Line item or menu row pointing at an order that doesn't exist.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK or NOT NULL rejection (negative price, quantity <= 0, unknown
    /// status).
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Every pooled connection stayed busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    // SQLite: "UNIQUE constraint failed: <table>.<column>[, ...]"
                    ErrorKind::UniqueViolation => {
                        let columns = message
                            .strip_prefix("UNIQUE constraint failed: ")
                            .unwrap_or(&message);
                        DbError::duplicate(columns, "unknown")
                    }
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                        DbError::CheckViolation { message }
                    }
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DbError::not_found("Order", "o-1").to_string(),
            "Order not found: o-1"
        );
        assert_eq!(
            DbError::duplicate("order_menu_items.name", "Es Teh").to_string(),
            "Duplicate order_menu_items.name: 'Es Teh' already exists"
        );
    }

    #[test]
    fn test_pool_errors() {
        assert!(matches!(
            DbError::from(sqlx::Error::RowNotFound),
            DbError::NotFound { .. }
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
    }

    #[tokio::test]
    async fn test_check_constraint_is_classified() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = sqlx::query(
            "INSERT INTO profiles (id, full_name, created_at, updated_at) VALUES ('p', NULL, '', '')",
        )
        .execute(db.pool())
        .await
        .map_err(DbError::from)
        .unwrap_err();

        assert!(matches!(err, DbError::CheckViolation { .. }));
    }
}
