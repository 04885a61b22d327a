/// Schema migrations
///
/// Migrations live in the workspace-level `migrations/` directory and are
/// embedded into the binary at compile time with `sqlx::migrate!`. sqlx takes
/// an advisory lock while applying them, so concurrent callers are safe.

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Applies pending migrations and returns how many were newly applied
///
/// # Errors
///
/// Returns an error if a migration fails to apply or the connection drops.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    let migrator = sqlx::migrate!("../migrations");
    let already_applied = applied_versions(pool).await?;

    if let Err(e) = migrator.run(pool).await {
        warn!(error = %e, "Migration failed");
        return Err(e);
    }

    let applied = migrator
        .iter()
        .filter(|migration| !already_applied.contains(&migration.version))
        .count();
    debug!(applied, embedded = migrator.iter().count(), "Database schema up to date");

    Ok(applied)
}

/// Versions recorded as successful; empty before the first run
async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>, sqlx::Error> {
    let tracked: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await?;

    if !tracked {
        return Ok(Vec::new());
    }

    sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
        .fetch_all(pool)
        .await
}

/// Creates the database named in `database_url` when it is missing
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        debug!("Database present");
        return Ok(());
    }

    info!("Creating database");
    Postgres::create_database(database_url).await
}
