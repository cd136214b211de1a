//! Database migration support.
//!
//! Embeds and runs SQL migrations from `confsched_core/migrations/`.
//! Safe to run repeatedly: applied migrations are skipped.

use sqlx::SqlitePool;

/// Run all embedded database migrations against the given pool.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
