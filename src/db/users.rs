//! User profile persistence — login upserts, lookups, contact updates.

use super::{Database, UserRow};
use anyhow::Result;

impl Database {
    // ── Login upsert ──────────────────────────────────────────────

    /// Insert the profile on first login, refresh name and avatars on every
    /// later one. Returns the row as it stands after the write.
    ///
    /// Runs as a single statement, so two first logins racing on the same
    /// `vk_id` cannot both insert; the loser's insert becomes an update.
    /// `phone` and `email` are absent from the update list on purpose: a
    /// login must never clobber contact data the user saved separately.
    pub async fn upsert_user_on_login(
        &self,
        vk_id: i64,
        first_name: &str,
        last_name: &str,
        photo_100: Option<&str>,
        photo_200: Option<&str>,
    ) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (vk_id, first_name, last_name, photo_100, photo_200)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (vk_id) DO UPDATE SET
               first_name = EXCLUDED.first_name,
               last_name = EXCLUDED.last_name,
               photo_100 = EXCLUDED.photo_100,
               photo_200 = EXCLUDED.photo_200,
               updated_at = NOW()
             RETURNING *",
        )
        .bind(vk_id)
        .bind(first_name)
        .bind(last_name)
        .bind(photo_100)
        .bind(photo_200)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // ── Full-profile save ─────────────────────────────────────────

    /// Upsert the complete profile including contact fields.
    ///
    /// Same shape as the login upsert with `phone` and `email` added to both
    /// the column list and the update list.
    pub async fn save_user_profile(
        &self,
        vk_id: i64,
        first_name: &str,
        last_name: &str,
        photo_100: Option<&str>,
        photo_200: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (vk_id, first_name, last_name, photo_100, photo_200, phone, email)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (vk_id) DO UPDATE SET
               first_name = EXCLUDED.first_name,
               last_name = EXCLUDED.last_name,
               photo_100 = EXCLUDED.photo_100,
               photo_200 = EXCLUDED.photo_200,
               phone = EXCLUDED.phone,
               email = EXCLUDED.email,
               updated_at = NOW()
             RETURNING *",
        )
        .bind(vk_id)
        .bind(first_name)
        .bind(last_name)
        .bind(photo_100)
        .bind(photo_200)
        .bind(phone)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // ── Lookup ────────────────────────────────────────────────────

    /// Look up a user by VK id. Returns `None` when no such user exists;
    /// a miss is not an error and must never create a row.
    pub async fn get_user_by_vk_id(&self, vk_id: i64) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE vk_id = $1")
            .bind(vk_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    // ── Contact updates ───────────────────────────────────────────

    /// Set the phone number for an existing user. Returns the updated row,
    /// or `None` when no row matches the VK id.
    pub async fn update_user_phone(&self, vk_id: i64, phone: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET phone = $2, updated_at = NOW()
             WHERE vk_id = $1
             RETURNING *",
        )
        .bind(vk_id)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Set the email for an existing user. Same contract as
    /// [`Database::update_user_phone`].
    pub async fn update_user_email(&self, vk_id: i64, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET email = $2, updated_at = NOW()
             WHERE vk_id = $1
             RETURNING *",
        )
        .bind(vk_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // ── Stats ─────────────────────────────────────────────────────

    /// Total number of registered users, for the `vynos_users_total` gauge.
    pub async fn count_users(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
