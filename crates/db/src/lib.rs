//! Postgres connection pool factory and migration runner.
//!
//! Migrations are contributed by modules through the kernel registry and
//! recorded in `_bookly_migrations` so each one is applied exactly once.

use std::time::Duration;

use anyhow::Context;
use bookly_kernel::{settings::Settings, Migration};
use sqlx::{postgres::PgPoolOptions, PgPool};

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _bookly_migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (module, id)
    )
"#;

/// Open the process-wide connection pool for the selected environment.
pub async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    let url = settings.database_url();

    tracing::info!(
        target: "bookly-db",
        url = %redact_url(&url),
        max_connections = settings.database.max_connections,
        "connecting to database"
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&url)
        .await
        .with_context(|| format!("failed to connect to {}", redact_url(&url)))?;

    let row: (i32,) = sqlx::query_as("SELECT 1")
        .fetch_one(&pool)
        .await
        .context("database health check failed")?;
    tracing::debug!(target: "bookly-db", result = row.0, "database health check passed");

    Ok(pool)
}

/// Apply every migration that has not been recorded yet.
///
/// Returns the number of migrations applied in this run.
pub async fn run_migrations(
    pool: &PgPool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::query(MIGRATIONS_TABLE)
        .execute(pool)
        .await
        .context("failed to create migrations table")?;

    let mut applied = 0;

    for (module, migration) in migrations {
        let exists: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM _bookly_migrations WHERE module = $1 AND id = $2",
        )
        .bind(module)
        .bind(migration.id)
        .fetch_optional(pool)
        .await
        .with_context(|| {
            format!("failed to look up migration {}/{}", module, migration.id)
        })?;

        if exists.is_some() {
            tracing::debug!(
                target: "bookly-db",
                module = %module,
                id = migration.id,
                "migration already applied"
            );
            continue;
        }

        tracing::info!(
            target: "bookly-db",
            module = %module,
            id = migration.id,
            "applying migration"
        );

        sqlx::raw_sql(migration.up)
            .execute(pool)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;

        sqlx::query("INSERT INTO _bookly_migrations (module, id) VALUES ($1, $2)")
            .bind(module)
            .bind(migration.id)
            .execute(pool)
            .await
            .with_context(|| format!("failed to record migration {}/{}", module, migration.id))?;

        applied += 1;
    }

    Ok(applied)
}

/// Mask the password component of a connection string for logging.
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}
