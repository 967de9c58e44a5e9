//! Test helpers: build AppState and router over in-memory backends.
//!
//! Run from workspace root: `cargo test -p docshuttle-api --test records_test`
//! or `cargo test -p docshuttle-api`. No database needed: the repository and
//! storage are the in-memory implementations.

use axum_test::TestServer;
use docshuttle_api::constants;
use docshuttle_api::setup::routes;
use docshuttle_api::state::AppState;
use docshuttle_convert::ConversionRunner;
use docshuttle_core::Config;
use docshuttle_db::MemoryFileRepository;
use docshuttle_services::{LifecycleService, NotificationHub};
use docshuttle_storage::MemoryStorage;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus handles on the backing stores.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MemoryStorage>,
    pub repository: Arc<MemoryFileRepository>,
    pub hub: NotificationHub,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Setup a test app whose converter copies the PDF to the output path.
#[cfg(unix)]
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_stub("#!/bin/sh\nout=\"${1%.pdf}.docx\"\ncp \"$1\" \"$out\"\n").await
}

/// Setup a test app with a converter script of the given body.
#[cfg(unix)]
pub async fn setup_test_app_with_stub(script: &str) -> TestApp {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let converter = temp_dir.path().join("converter.sh");
    std::fs::write(&converter, script).expect("Failed to write converter stub");
    let mut perms = std::fs::metadata(&converter).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&converter, perms).unwrap();

    build_app(temp_dir, converter.to_string_lossy().into_owned(), false).await
}

/// Setup a test app whose converter is never invoked (records-only tests).
pub async fn setup_records_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    build_app(temp_dir, "/bin/true".to_string(), false).await
}

/// Setup a records app served over a real HTTP transport, which WebSocket
/// tests require.
pub async fn setup_events_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    build_app(temp_dir, "/bin/true".to_string(), true).await
}

async fn build_app(temp_dir: TempDir, converter_program: String, http_transport: bool) -> TestApp {
    let upload_dir = temp_dir.path().join("uploads");
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .expect("Failed to create upload directory");

    let storage = Arc::new(MemoryStorage::new());
    let repository = Arc::new(MemoryFileRepository::new());
    let hub = NotificationHub::new();

    let runner =
        ConversionRunner::new(converter_program.clone(), vec![]).expect("Invalid converter stub");
    let lifecycle = LifecycleService::new(
        storage.clone(),
        repository.clone(),
        runner,
        hub.clone(),
    );

    let state = Arc::new(AppState {
        config: test_config(temp_dir.path(), &converter_program),
        lifecycle,
        hub: hub.clone(),
        upload_dir,
    });

    let router = routes::build_router(state).expect("Failed to build router");
    let mut builder = TestServer::builder().save_cookies();
    if http_transport {
        builder = builder.http_transport();
    }
    let server = builder.build(router).expect("Failed to start test server");

    TestApp {
        server,
        storage,
        repository,
        hub,
        _temp_dir: temp_dir,
    }
}

fn test_config(base: &Path, converter_program: &str) -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        environment: "test".to_string(),
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 5,
        storage_path: path_string(base, "storage"),
        storage_base_url: "http://localhost:5050/files".to_string(),
        upload_dir: path_string(base, "uploads"),
        converter_program: converter_program.to_string(),
        converter_args: vec![],
        max_file_size_bytes: 10 * 1024 * 1024,
        sweep_interval_secs: 60,
    }
}

fn path_string(base: &Path, child: &str) -> String {
    let path: PathBuf = base.join(child);
    path.to_string_lossy().into_owned()
}
