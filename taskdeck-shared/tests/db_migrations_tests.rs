/// Integration tests for database migrations
///
/// Skipped when `DATABASE_URL` is not set.

use taskdeck_shared::db::migrations::{ensure_database_exists, run_migrations};
use taskdeck_shared::db::pool::{close_pool, create_pool, DatabaseConfig};

fn database_url() -> Option<String> {
    let url = std::env::var("DATABASE_URL").ok();
    if url.is_none() {
        eprintln!("DATABASE_URL not set, skipping database test");
    }
    url
}

#[tokio::test]
async fn test_run_migrations() {
    let Some(url) = database_url() else { return };

    ensure_database_exists(&url).await.expect("Failed to create database");
    let pool = create_pool(DatabaseConfig::new(url)).await.expect("Failed to create pool");

    run_migrations(&pool).await.expect("Migrations failed");

    let recorded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(&pool)
        .await
        .expect("Failed to read migration table");
    assert!(recorded >= 3, "All migrations should be recorded");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_second_run_applies_nothing() {
    let Some(url) = database_url() else { return };

    ensure_database_exists(&url).await.expect("Failed to create database");
    let pool = create_pool(DatabaseConfig::new(url)).await.expect("Failed to create pool");

    run_migrations(&pool).await.expect("First migration run failed");
    let applied = run_migrations(&pool).await.expect("Second migration run failed");

    assert_eq!(applied, 0);

    close_pool(pool).await;
}

#[tokio::test]
async fn test_migration_creates_all_tables() {
    let Some(url) = database_url() else { return };

    ensure_database_exists(&url).await.expect("Failed to create database");
    let pool = create_pool(DatabaseConfig::new(url)).await.expect("Failed to create pool");
    run_migrations(&pool).await.expect("Migrations failed");

    for table in ["users", "projects", "categories", "tasks"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .expect("Failed to query information_schema");

        assert!(exists, "Table {} should exist", table);
    }

    for type_name in ["task_status", "task_priority"] {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT FROM pg_type WHERE typname = $1)")
            .bind(type_name)
            .fetch_one(&pool)
            .await
            .expect("Failed to query pg_type");

        assert!(exists, "Enum type {} should exist", type_name);
    }

    close_pool(pool).await;
}
