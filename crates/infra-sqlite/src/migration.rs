// Migration Runner

use crate::error::map_sqlx_error;
use sqlx::SqlitePool;
use tidemq_core::error::Result;
use tracing::debug;

/// (version, description, sql), applied in order
const MIGRATIONS: &[(i64, &str, &str)] = &[(
    1,
    "Initial schema",
    include_str!("../migrations/001_initial_schema.sql"),
)];

/// Run database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Check if schema_version table exists
    let table_exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
    )
    .fetch_one(pool)
    .await
    .map_err(map_sqlx_error("migrate"))?;

    let current_version: i64 = if table_exists > 0 {
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await
            .map_err(map_sqlx_error("migrate"))?
            .unwrap_or(0)
    } else {
        0
    };

    for (version, description, sql) in MIGRATIONS {
        if current_version < *version {
            debug!(version, description, "Applying migration");
            apply_migration(pool, sql).await?;
        }
    }

    Ok(())
}

/// Apply a single migration SQL file
async fn apply_migration(pool: &SqlitePool, sql: &str) -> Result<()> {
    // Execute migration in a transaction
    let mut tx = pool.begin().await.map_err(map_sqlx_error("migrate"))?;

    for statement in split_statements(sql) {
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error("migrate"))?;
    }

    tx.commit().await.map_err(map_sqlx_error("migrate"))?;
    Ok(())
}

// Comments go first: a `;` inside a `--` comment must not end a statement
fn split_statements(sql: &str) -> Vec<String> {
    let without_comments = sql
        .lines()
        .map(|line| match line.find("--") {
            Some(pos) => &line[..pos],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n");

    without_comments
        .split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_pool;

    #[tokio::test]
    async fn test_run_migrations() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn test_split_ignores_semicolons_in_comments() {
        let sql = "-- header; with a semicolon\nCREATE TABLE a (x INTEGER); -- trailing\n\nCREATE TABLE b (y TEXT -- inline; note\n);\n";
        let statements = split_statements(sql);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0], "CREATE TABLE a (x INTEGER)");
        assert!(statements[1].starts_with("CREATE TABLE b"));
        assert!(!statements[1].contains("note"));
    }

    #[test]
    fn test_initial_schema_splits_into_statements() {
        let statements = split_statements(MIGRATIONS[0].2);
        assert_eq!(statements.len(), 3);
        assert!(statements.iter().all(|s| !s.contains("--")));
    }
}
