//! OS watch handle lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use blobdrop_shared::WatchConfig;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, trace, warn};

use super::error::WatcherError;
use super::event::FileEvent;
use super::filter::FilePattern;

/// Lifecycle state of a [`DirectoryWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Never armed, or arming failed.
    Unarmed,
    /// Receiving notifications.
    Armed,
    /// Handle alive, notifications suppressed.
    Disarmed,
    /// Handle dropped.
    Released,
}

/// Watches one folder, non-recursively, for created files.
///
/// Matching creations are sent as [`FileEvent`]s into the channel handed to
/// [`DirectoryWatcher::start`]. The watcher never processes them itself.
#[derive(Debug)]
pub struct DirectoryWatcher {
    state: WatcherState,
    handle: Option<RecommendedWatcher>,
    armed: Arc<AtomicBool>,
}

impl Default for DirectoryWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryWatcher {
    /// Create an unarmed watcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: WatcherState::Unarmed,
            handle: None,
            armed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Whether an OS watch handle is currently held.
    #[must_use]
    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    /// Arm the watcher.
    ///
    /// On any error the watcher stays `Unarmed` and holds no handle.
    ///
    /// # Errors
    ///
    /// - [`WatcherError::InvalidState`] if not `Unarmed`
    /// - [`WatcherError::FolderMissing`] if the input folder is not a directory
    /// - [`WatcherError::InvalidPattern`] if the glob does not compile
    /// - [`WatcherError::Notify`] if the OS backend refuses the watch
    pub fn start(
        &mut self,
        config: &WatchConfig,
        events: UnboundedSender<FileEvent>,
    ) -> Result<(), WatcherError> {
        if self.state != WatcherState::Unarmed {
            return Err(WatcherError::InvalidState(self.state));
        }
        if !config.input_folder.is_dir() {
            return Err(WatcherError::folder_missing(&config.input_folder));
        }

        let filter = FilePattern::new(&config.file_pattern)?;
        // Backends report paths under the watched path; FSEvents resolves it.
        let folder = config
            .input_folder
            .canonicalize()
            .map_err(|_| WatcherError::folder_missing(&config.input_folder))?;
        let armed = Arc::clone(&self.armed);
        let inbox = folder.clone();

        let mut handle = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !armed.load(Ordering::Acquire) {
                        trace!(?event.kind, "Notification while disarmed, ignoring");
                        return;
                    }
                    for file_event in FileEvent::from_notify(&event, &filter, &inbox) {
                        if events.send(file_event).is_err() {
                            debug!("Event loop gone, dropping notification");
                            return;
                        }
                    }
                }
                Err(e) => warn!(error = %e, "File watcher reported an error"),
            },
            Config::default(),
        )?;
        handle.watch(&folder, RecursiveMode::NonRecursive)?;

        self.armed.store(true, Ordering::Release);
        self.handle = Some(handle);
        self.state = WatcherState::Armed;

        info!(
            folder = %folder.display(),
            pattern = %config.file_pattern,
            "Binding events from input folder"
        );
        Ok(())
    }

    /// Stop forwarding notifications. The OS handle is kept until
    /// [`DirectoryWatcher::dispose`].
    ///
    /// A no-op unless `Armed`.
    pub fn stop(&mut self) {
        if self.state != WatcherState::Armed {
            return;
        }
        self.armed.store(false, Ordering::Release);
        self.state = WatcherState::Disarmed;
    }

    /// Drop the OS handle. Safe from any state, including never armed.
    pub fn dispose(&mut self) {
        self.armed.store(false, Ordering::Release);
        if self.handle.take().is_some() {
            debug!("Released file watch handle");
        }
        self.state = WatcherState::Released;
    }
}
