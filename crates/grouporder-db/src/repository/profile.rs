//! # Profile Repository
//!
//! Display names of users. Authentication lives outside this system; a
//! profile is just the name shown next to a user's line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// A user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository for profile database operations.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    /// Creates a new ProfileRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// Gets a profile by user ID.
    pub async fn get(&self, user_id: &str) -> DbResult<Option<Profile>> {
        let profile: Option<Profile> = sqlx::query_as(
            r#"
            SELECT id, full_name, created_at, updated_at
            FROM profiles
            WHERE id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Creates the profile or renames an existing one.
    pub async fn upsert(&self, user_id: &str, full_name: &str) -> DbResult<()> {
        debug!(user_id = %user_id, "Upserting profile");
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO profiles (id, full_name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (id) DO UPDATE SET
                full_name = excluded.full_name,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_upsert_and_rename() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let profiles = db.profiles();

        assert!(profiles.get("alice").await.unwrap().is_none());

        profiles.upsert("alice", "Alice").await.unwrap();
        let created = profiles.get("alice").await.unwrap().unwrap();
        assert_eq!(created.full_name, "Alice");

        profiles.upsert("alice", "Alice Wijaya").await.unwrap();
        let renamed = profiles.get("alice").await.unwrap().unwrap();
        assert_eq!(renamed.full_name, "Alice Wijaya");
        assert_eq!(renamed.created_at, created.created_at);
    }
}
