//! Application initialization: database, services, routes.

pub mod database;
pub mod routes;
pub mod server;

use anyhow::{Context, Result};
use axum::Router;
use docshuttle_convert::ConversionRunner;
use docshuttle_core::Config;
use docshuttle_db::PgFileRepository;
use docshuttle_services::{ExpirySweeper, LifecycleService, NotificationHub};
use docshuttle_storage::LocalStorage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::state::AppState;

/// Wire up the database, storage, services and router, and start the
/// background sweeper.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    let pool = database::setup_database(&config).await?;

    let upload_dir = PathBuf::from(&config.upload_dir);
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", upload_dir.display()))?;

    let storage = Arc::new(
        LocalStorage::new(&config.storage_path, config.storage_base_url.clone())
            .await
            .context("Failed to initialize storage")?,
    );
    let repository = Arc::new(PgFileRepository::new(pool));

    let runner = ConversionRunner::new(
        config.converter_program.clone(),
        config.converter_args.clone(),
    )
    .context("Invalid converter configuration")?;

    let hub = NotificationHub::new();
    let lifecycle = LifecycleService::new(
        storage.clone(),
        repository.clone(),
        runner,
        hub.clone(),
    );

    let sweeper = Arc::new(ExpirySweeper::new(
        storage,
        repository,
        hub.clone(),
        Duration::from_secs(config.sweep_interval_secs),
    ));
    // Detached: the sweeper runs until the process exits.
    sweeper.start();
    tracing::info!(
        sweep_interval_secs = config.sweep_interval_secs,
        "Expiry sweeper started"
    );

    let state = Arc::new(AppState {
        config,
        lifecycle,
        hub,
        upload_dir,
    });

    let router = routes::build_router(state.clone())?;

    Ok((state, router))
}
