use chrono::Utc;
use docshuttle_core::constants::retention;
use docshuttle_core::models::LifecycleEvent;
use docshuttle_db::FileRepository;
use docshuttle_storage::Storage;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::NotificationHub;

/// Counters for one sweep, logged after each run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Expired blobs removed together with their record.
    pub expired_files: usize,
    /// Expired blobs with no matching record.
    pub orphan_blobs: usize,
    /// Expired records whose blob was already gone.
    pub dangling_records: usize,
    /// Candidates skipped because an operation on them failed.
    pub errors: usize,
}

impl SweepReport {
    pub fn total_removed(&self) -> usize {
        self.expired_files + self.orphan_blobs + self.dangling_records
    }
}

/// Background enforcement of the retention window.
///
/// Walks storage for blobs past their retention and removes blob, record and
/// announces each removal; a second pass repairs records whose blob is
/// already gone. Failures are isolated per candidate so one bad entry never
/// aborts a sweep.
#[derive(Clone)]
pub struct ExpirySweeper {
    storage: Arc<dyn Storage>,
    repository: Arc<dyn FileRepository>,
    hub: NotificationHub,
    sweep_interval: Duration,
}

impl ExpirySweeper {
    pub fn new(
        storage: Arc<dyn Storage>,
        repository: Arc<dyn FileRepository>,
        hub: NotificationHub,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            storage,
            repository,
            hub,
            sweep_interval,
        }
    }

    /// Start the background sweep task. The task runs for the life of the
    /// process; the returned handle can be used to abort it early.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.sweep_interval);

            loop {
                sweep_interval.tick().await;

                let report = self.sweep().await;

                if report.total_removed() > 0 || report.errors > 0 {
                    tracing::info!(
                        expired_files = report.expired_files,
                        orphan_blobs = report.orphan_blobs,
                        dangling_records = report.dangling_records,
                        errors = report.errors,
                        "Sweep completed"
                    );
                }
            }
        })
    }

    /// Run one sweep. Public so tests and operators can trigger it directly.
    #[tracing::instrument(skip(self))]
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();

        self.sweep_expired_blobs(&mut report).await;
        self.sweep_dangling_records(&mut report).await;

        report
    }

    /// Pass 1: walk every namespace and remove blobs past the retention
    /// window, together with their record when one exists. A blob with no
    /// record is an orphan from a failed register step; it is removed
    /// without a broadcast because no client ever saw it.
    async fn sweep_expired_blobs(&self, report: &mut SweepReport) {
        let namespaces = match self.storage.list_namespaces().await {
            Ok(namespaces) => namespaces,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list namespaces, skipping blob pass");
                report.errors += 1;
                return;
            }
        };

        let cutoff = Utc::now() - retention();

        for namespace in namespaces {
            let blobs = match self.storage.list(&namespace).await {
                Ok(blobs) => blobs,
                Err(e) => {
                    tracing::error!(error = %e, namespace = %namespace, "Failed to list namespace");
                    report.errors += 1;
                    continue;
                }
            };

            for blob in blobs {
                if blob.created_at >= cutoff {
                    continue;
                }

                tracing::info!(
                    namespace = %namespace,
                    blob = %blob.name,
                    created_at = %blob.created_at,
                    "Removing expired blob"
                );

                if let Err(e) = self.storage.remove(&namespace, &blob.name).await {
                    tracing::error!(
                        error = %e,
                        namespace = %namespace,
                        blob = %blob.name,
                        "Failed to remove expired blob"
                    );
                    report.errors += 1;
                    continue;
                }

                match self.repository.find_by_stored_name(&blob.name).await {
                    Ok(Some(record)) => {
                        match self.repository.delete(record.id).await {
                            Ok(_) => {
                                report.expired_files += 1;
                                self.hub.broadcast(LifecycleEvent::FileDeleted);
                            }
                            Err(e) => {
                                // Blob is gone; the record is now dangling and
                                // the repair pass picks it up next sweep.
                                tracing::error!(
                                    error = %e,
                                    record_id = %record.id,
                                    "Failed to delete record for expired blob"
                                );
                                report.errors += 1;
                            }
                        }
                    }
                    Ok(None) => {
                        report.orphan_blobs += 1;
                        tracing::debug!(
                            namespace = %namespace,
                            blob = %blob.name,
                            "Removed orphan blob with no record"
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            blob = %blob.name,
                            "Failed to resolve record for expired blob"
                        );
                        report.errors += 1;
                    }
                }
            }
        }
    }

    /// Pass 2: expired records whose blob is already gone. The record was
    /// user-visible, so its removal is announced like any other deletion.
    async fn sweep_dangling_records(&self, report: &mut SweepReport) {
        let expired = match self.repository.list_expired(Utc::now()).await {
            Ok(expired) => expired,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list expired records, skipping repair pass");
                report.errors += 1;
                return;
            }
        };

        for record in expired {
            match self
                .storage
                .exists(&record.user_id, &record.stored_name)
                .await
            {
                Ok(true) => {
                    // Blob still present with an unexpired created_at means
                    // the record and blob clocks disagree; leave it for the
                    // blob pass rather than deleting metadata under a live
                    // blob.
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(error = %e, record_id = %record.id, "Failed to check blob presence");
                    report.errors += 1;
                    continue;
                }
            }

            match self.repository.delete(record.id).await {
                Ok(true) => {
                    tracing::info!(
                        record_id = %record.id,
                        stored_name = %record.stored_name,
                        "Removed dangling record"
                    );
                    report.dangling_records += 1;
                    self.hub.broadcast(LifecycleEvent::FileDeleted);
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(error = %e, record_id = %record.id, "Failed to delete dangling record");
                    report.errors += 1;
                }
            }
        }
    }
}
