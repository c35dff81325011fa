//! Saved address persistence — list, create, delete.
//!
//! Addresses hang off the surrogate `users.id`, not `vk_id`; the Mini App
//! gets the surrogate id back from every profile response.

use super::Database;
use anyhow::Result;
use serde::Serialize;

/// Address row from the `addresses` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AddressRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub address_text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Database {
    /// List a user's saved addresses, newest first. The `id` tiebreak keeps
    /// the order stable when two rows share a timestamp.
    pub async fn get_user_addresses(&self, user_id: i64) -> Result<Vec<AddressRow>> {
        let rows = sqlx::query_as::<_, AddressRow>(
            "SELECT * FROM addresses
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a new address and return the created row.
    ///
    /// A dangling `user_id` trips the foreign key constraint; the handler
    /// layer classifies that as a caller error.
    pub async fn create_address(
        &self,
        user_id: i64,
        title: &str,
        address_text: &str,
    ) -> Result<AddressRow> {
        let row = sqlx::query_as::<_, AddressRow>(
            "INSERT INTO addresses (user_id, title, address_text)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(user_id)
        .bind(title)
        .bind(address_text)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Delete an address by id. Returns `false` when no row matched, so the
    /// handler can answer 404 instead of pretending the delete happened.
    pub async fn delete_address(&self, address_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(address_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
