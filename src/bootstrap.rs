//! Composition root: owns the connection pool and wires it into the modules.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookly_kernel::{
    settings::{DatabaseBackend, Settings},
    InitCtx, ModuleRegistry,
};
use sqlx::PgPool;

use crate::modules::{
    self,
    books::store::{BookStore, InMemoryBookStore, PgBookStore},
};

/// Open the store selected by `database.backend`. The pool is returned so the
/// caller can close it on shutdown.
pub async fn open_store(
    settings: &Settings,
) -> anyhow::Result<(Arc<dyn BookStore>, Option<PgPool>)> {
    match settings.database.backend {
        DatabaseBackend::Postgres => {
            let pool = bookly_db::connect(settings).await?;
            Ok((Arc::new(PgBookStore::new(pool.clone())), Some(pool)))
        }
        DatabaseBackend::Memory => {
            tracing::warn!("using in-memory book store; data is lost on shutdown");
            Ok((Arc::new(InMemoryBookStore::new()), None))
        }
    }
}

/// Registry holding every module, backed by `store`.
pub fn build_registry(store: Arc<dyn BookStore>) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store).context("failed to register modules")?;
    Ok(registry)
}

/// Full application router over `store`, as served in production.
pub fn app_router(store: Arc<dyn BookStore>, settings: &Settings) -> anyhow::Result<Router> {
    let registry = build_registry(store)?;
    Ok(bookly_http::build_router(&registry, settings))
}

/// Apply pending module migrations.
pub async fn migrate(pool: &PgPool, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    let migrations = registry.collect_migrations();
    let applied = bookly_db::run_migrations(pool, &migrations)
        .await
        .context("failed to run migrations")?;
    tracing::info!(applied, total = migrations.len(), "migrations complete");
    Ok(applied)
}

/// Run the server until a shutdown signal arrives.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "bookly bootstrap starting"
    );

    let (store, pool) = open_store(&settings).await?;
    let registry = build_registry(store)?;

    if let Some(pool) = &pool {
        migrate(pool, &registry).await?;
    }

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("bookly bootstrap complete");

    let served = bookly_http::start_server(&registry, &settings).await;

    registry.stop_modules().await?;
    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("database pool closed");
    }

    served
}

/// Connect, migrate, and disconnect.
pub async fn migrate_only(settings: &Settings) -> anyhow::Result<usize> {
    let pool = bookly_db::connect(settings).await?;
    let registry = build_registry(Arc::new(PgBookStore::new(pool.clone())))?;
    let applied = migrate(&pool, &registry).await;
    pool.close().await;
    applied
}
