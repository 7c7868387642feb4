//! Hosted upload service.
//!
//! Ties the directory watcher to the transfer pipeline through a channel
//! drained by a single event loop task. The loop handles one event at a
//! time, from dedup check through upload completion, so uploads are
//! serialized and the dedup slot needs no lock.

use std::sync::Arc;

use blobdrop_shared::{AppError, AppResult, WatchConfig};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::pipeline::TransferPipeline;
use crate::storage::ObjectStore;
use crate::watcher::{DirectoryWatcher, FileEvent, LastAccepted, WatcherError, WatcherState};

/// Result of [`UploadService::start`].
#[derive(Debug)]
pub enum StartOutcome {
    /// Watching the input folder.
    Armed,
    /// Running without a watch; the reason was logged as a warning.
    Idle(AppError),
}

impl StartOutcome {
    /// Whether the folder is being watched.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed)
    }
}

/// Counters reported by the event loop when it exits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    /// Events received from the watcher.
    pub received: u64,
    /// Events dropped as immediate repeats.
    pub duplicates: u64,
    /// Uploads that completed.
    pub uploaded: u64,
    /// Uploads that failed and were logged.
    pub failed: u64,
}

/// Background service that uploads files created in the input folder.
pub struct UploadService<S: ObjectStore> {
    watch: WatchConfig,
    pipeline: Arc<TransferPipeline<S>>,
    watcher: DirectoryWatcher,
    shutdown: CancellationToken,
    worker: Option<JoinHandle<LoopStats>>,
}

impl<S: ObjectStore> UploadService<S> {
    /// Create a service for `watch` writing into `store`.
    #[must_use]
    pub fn new(watch: WatchConfig, store: Arc<S>) -> Self {
        Self {
            watch,
            pipeline: Arc::new(TransferPipeline::new(store)),
            watcher: DirectoryWatcher::new(),
            shutdown: CancellationToken::new(),
            worker: None,
        }
    }

    /// Current watcher state.
    #[must_use]
    pub fn watcher_state(&self) -> WatcherState {
        self.watcher.state()
    }

    /// Arm the watcher and spawn the event loop.
    ///
    /// A missing input folder, a bad pattern or a refused OS watch is not
    /// an error: the service logs a warning and stays idle until restarted.
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Cancelled`] if `cancel` already fired.
    pub fn start(&mut self, cancel: &CancellationToken) -> AppResult<StartOutcome> {
        info!("Service starting");

        if cancel.is_cancelled() {
            return Err(AppError::Cancelled("service start".into()));
        }
        if self.watcher.state() == WatcherState::Armed {
            return Ok(StartOutcome::Armed);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        if let Err(e) = self.watcher.start(&self.watch, tx) {
            match &e {
                WatcherError::FolderMissing { path } => warn!(
                    folder = %path.display(),
                    "Please make sure the input folder exists, then restart the service"
                ),
                other => warn!(error = %other, "File watcher not armed, service is idle"),
            }
            return Ok(StartOutcome::Idle(e.into()));
        }

        let pipeline = Arc::clone(&self.pipeline);
        let shutdown = self.shutdown.clone();
        self.worker = Some(tokio::spawn(run_event_loop(rx, pipeline, shutdown)));

        Ok(StartOutcome::Armed)
    }

    /// Disarm the watcher and wait for the event loop to finish.
    ///
    /// An upload already in progress runs to completion; queued events are
    /// dropped. If `cancel` fires first, stop returns without waiting and the
    /// loop finishes on its own.
    pub async fn stop(&mut self, cancel: &CancellationToken) {
        info!("Stopping service");

        self.watcher.stop();
        self.shutdown.cancel();

        let Some(worker) = self.worker.take() else {
            return;
        };
        tokio::select! {
            res = worker => match res {
                Ok(stats) => debug!(?stats, "Event loop finished"),
                Err(e) => warn!(error = %e, "Event loop task failed"),
            },
            () = cancel.cancelled() => {
                warn!("Stop cancelled before the in-flight upload completed");
            }
        }
    }

    /// Release the OS watch handle. Safe to call whether or not the service
    /// was ever armed or stopped.
    pub fn dispose(&mut self) {
        info!("Disposing service");

        self.shutdown.cancel();
        self.watcher.dispose();
        // A worker still present here was never stopped; it exits after its
        // current event.
        drop(self.worker.take());
    }
}

/// Drain `events` until `shutdown` fires or every sender is gone.
///
/// Shutdown is only observed between events.
pub async fn run_event_loop<S: ObjectStore>(
    mut events: UnboundedReceiver<FileEvent>,
    pipeline: Arc<TransferPipeline<S>>,
    shutdown: CancellationToken,
) -> LoopStats {
    let mut last = LastAccepted::new();
    let mut stats = LoopStats::default();

    loop {
        let event = tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };
        stats.received += 1;

        if !last.accept(&event.name) {
            stats.duplicates += 1;
            continue;
        }

        info!(path = %event.full_path.display(), "Inbound change event triggered");
        if pipeline.upload(&event).await {
            stats.uploaded += 1;
        } else {
            stats.failed += 1;
        }
        info!("Done with inbound change event");
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingStore;
    use std::path::Path;
    use std::time::Duration;

    fn write_files(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), name.as_bytes()).expect("write file");
        }
    }

    async fn drain(dir: &Path, names: &[&str], store: Arc<RecordingStore>) -> LoopStats {
        let (tx, rx) = mpsc::unbounded_channel();
        for name in names {
            tx.send(FileEvent::created(dir.join(name)).expect("utf-8 name"))
                .expect("receiver alive");
        }
        drop(tx);

        let pipeline = Arc::new(TransferPipeline::new(store));
        run_event_loop(rx, pipeline, CancellationToken::new()).await
    }

    #[tokio::test]
    async fn test_distinct_names_upload_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_files(dir.path(), &["invoice1.PDF", "invoice2.PDF"]);
        let store = Arc::new(RecordingStore::new());

        let stats = drain(
            dir.path(),
            &["invoice1.PDF", "invoice2.PDF"],
            Arc::clone(&store),
        )
        .await;

        assert_eq!(store.keys(), vec!["invoice1.PDF", "invoice2.PDF"]);
        assert_eq!(stats.uploaded, 2);
        assert_eq!(stats.duplicates, 0);
    }

    #[tokio::test]
    async fn test_immediate_duplicate_dropped() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_files(dir.path(), &["a.PDF"]);
        let store = Arc::new(RecordingStore::new());

        let stats = drain(dir.path(), &["a.PDF", "a.PDF"], Arc::clone(&store)).await;

        assert_eq!(store.keys(), vec!["a.PDF"]);
        assert_eq!(
            stats,
            LoopStats {
                received: 2,
                duplicates: 1,
                uploaded: 1,
                failed: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_non_adjacent_repeat_processed() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_files(dir.path(), &["A.PDF", "B.PDF"]);
        let store = Arc::new(RecordingStore::new());

        drain(dir.path(), &["A.PDF", "B.PDF", "A.PDF"], Arc::clone(&store)).await;

        assert_eq!(store.keys(), vec!["A.PDF", "B.PDF", "A.PDF"]);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_files(dir.path(), &["X.PDF", "Y.PDF"]);
        let store = Arc::new(RecordingStore::new().failing_on("X.PDF"));

        let stats = drain(dir.path(), &["X.PDF", "Y.PDF"], Arc::clone(&store)).await;

        assert_eq!(store.keys(), vec!["Y.PDF"]);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.uploaded, 1);
    }

    #[tokio::test]
    async fn test_failed_name_still_occupies_dedup_slot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(RecordingStore::new());

        let stats = drain(dir.path(), &["gone.PDF", "gone.PDF"], Arc::clone(&store)).await;

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.duplicates, 1);
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_in_flight_upload_finishes_after_shutdown() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_files(dir.path(), &["slow.PDF", "queued.PDF"]);
        let store = Arc::new(RecordingStore::new().with_delay(Duration::from_millis(500)));
        let pipeline = Arc::new(TransferPipeline::new(Arc::clone(&store)));
        let shutdown = CancellationToken::new();

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(FileEvent::created(dir.path().join("slow.PDF")).expect("utf-8 name"))
            .expect("receiver alive");
        let worker = tokio::spawn(run_event_loop(rx, pipeline, shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(FileEvent::created(dir.path().join("queued.PDF")).expect("utf-8 name"))
            .expect("receiver alive");
        shutdown.cancel();

        let stats = worker.await.expect("loop task");
        assert_eq!(store.keys(), vec!["slow.PDF"]);
        assert_eq!(stats.uploaded, 1);
    }

    async fn wait_until(what: impl Fn() -> bool) -> bool {
        for _ in 0..100 {
            if what() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        what()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_returns_when_host_cancels_during_upload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let upload_time = Duration::from_secs(1);
        let store = Arc::new(RecordingStore::new().with_delay(upload_time));
        let mut service = UploadService::new(WatchConfig::new(dir.path()), Arc::clone(&store));

        assert!(service.start(&CancellationToken::new()).expect("start").is_armed());
        write_files(dir.path(), &["slow.PDF"]);
        assert!(wait_until(|| store.attempts() == 1).await, "upload never started");

        let host = CancellationToken::new();
        let deadline = host.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            deadline.cancel();
        });

        let begun = tokio::time::Instant::now();
        service.stop(&host).await;
        assert!(begun.elapsed() < upload_time / 2);
        assert!(store.keys().is_empty());

        assert!(wait_until(|| !store.keys().is_empty()).await, "upload abandoned");
        assert_eq!(store.keys(), vec!["slow.PDF"]);
        service.dispose();
    }

    #[tokio::test]
    async fn test_missing_folder_leaves_service_idle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let watch = WatchConfig::new(dir.path().join("missing"));
        let store = Arc::new(RecordingStore::new());
        let mut service = UploadService::new(watch, Arc::clone(&store));
        let host = CancellationToken::new();

        let outcome = service.start(&host).expect("start never fails on a missing folder");
        assert!(matches!(outcome, StartOutcome::Idle(AppError::Watcher(_))));
        assert!(!outcome.is_armed());
        assert_eq!(service.watcher_state(), WatcherState::Unarmed);

        service.stop(&host).await;
        service.dispose();
        assert_eq!(service.watcher_state(), WatcherState::Released);
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_start_after_cancel_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut service =
            UploadService::new(WatchConfig::new(dir.path()), Arc::new(RecordingStore::new()));
        let host = CancellationToken::new();
        host.cancel();

        let err = service.start(&host).unwrap_err();
        assert!(matches!(err, AppError::Cancelled(_)));
        assert_eq!(service.watcher_state(), WatcherState::Unarmed);
    }

    #[tokio::test]
    async fn test_start_stop_dispose_lifecycle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut service =
            UploadService::new(WatchConfig::new(dir.path()), Arc::new(RecordingStore::new()));
        let host = CancellationToken::new();

        assert!(service.start(&host).expect("start").is_armed());
        assert_eq!(service.watcher_state(), WatcherState::Armed);
        assert!(service.start(&host).expect("second start").is_armed());

        service.stop(&host).await;
        assert_eq!(service.watcher_state(), WatcherState::Disarmed);

        service.dispose();
        service.dispose();
        assert_eq!(service.watcher_state(), WatcherState::Released);
    }

    #[tokio::test]
    async fn test_dispose_without_stop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut service =
            UploadService::new(WatchConfig::new(dir.path()), Arc::new(RecordingStore::new()));

        service.start(&CancellationToken::new()).expect("start");
        service.dispose();
        assert_eq!(service.watcher_state(), WatcherState::Released);
    }
}
