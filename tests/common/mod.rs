//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Once;

/// Returns the test database URL from the `TEST_DATABASE_URL` environment variable.
/// Panics if the variable is not set.
pub fn test_db_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set for integration tests")
}

/// Returns true if the test database URL is configured.
pub fn has_test_db() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

/// One-time schema initialization.
static SCHEMA_INIT: Once = Once::new();

/// Ensure the test database schema is set up (runs migrations once per test suite).
///
/// Integration tests run from the package root, so the relative `migrations`
/// path resolves to the crate's own migration files. The work happens on a
/// throwaway thread with its own runtime; callers sit inside a
/// `#[tokio::test]` runtime, which cannot be re-entered with `block_on`.
pub fn ensure_schema() {
    SCHEMA_INIT.call_once(|| {
        std::thread::spawn(|| {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let db = connect_db_inner().await;
                db.migrate(std::path::Path::new("migrations"))
                    .await
                    .expect("Failed to apply migrations to test database");
            });
        })
        .join()
        .expect("schema init thread panicked");
    });
}

async fn connect_db_inner() -> vynos::db::Database {
    let settings = vynos::db::ConnectSettings::from_url(&test_db_url());
    vynos::db::Database::connect(&settings)
        .await
        .expect("Failed to connect to test database")
}

/// Connect to the test database without wiping it. Used by tests that need
/// to inspect state created through the HTTP surface.
pub async fn connect_db() -> vynos::db::Database {
    ensure_schema();
    connect_db_inner().await
}

/// Connect to the test database with a clean slate (also ensures schema is set up).
pub async fn setup_test_db() -> vynos::db::Database {
    ensure_schema();
    let db = connect_db_inner().await;
    truncate_all_tables(db.pool()).await;
    db
}

/// Build an Axum test app router connected to the test database.
pub async fn build_test_app() -> axum::Router {
    let db = setup_test_db().await;
    let state = vynos::api::AppState::with_db(db);
    vynos::api::build_router(state)
}

/// Truncate all tables to ensure test isolation.
pub async fn truncate_all_tables(pool: &sqlx::PgPool) {
    sqlx::raw_sql("TRUNCATE TABLE addresses, users CASCADE")
        .execute(pool)
        .await
        .unwrap();
}
