//! Application state shared across handlers.

use docshuttle_core::Config;
use docshuttle_services::{LifecycleService, NotificationHub};
use std::path::PathBuf;

/// Everything a handler needs: configuration, the lifecycle orchestrator and
/// the event hub. Storage and repository live behind the lifecycle service;
/// handlers never touch them directly.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub lifecycle: LifecycleService,
    pub hub: NotificationHub,
    /// Working directory for incoming PDFs, created at startup.
    pub upload_dir: PathBuf,
}
