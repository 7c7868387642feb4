//! Test doubles shared by unit tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;

use crate::storage::{ObjectStore, StorageError};

/// Store that records every `put` in call order.
#[derive(Default)]
pub(crate) struct RecordingStore {
    puts: Mutex<Vec<(String, Bytes)>>,
    attempts: AtomicUsize,
    failing: HashSet<String>,
    delay: Option<Duration>,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reject writes for `key`.
    pub(crate) fn failing_on(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    /// Sleep inside every `put`.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Keys of successful puts, in order.
    pub(crate) fn keys(&self) -> Vec<String> {
        self.puts
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Number of `put` calls entered so far, finished or not.
    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Data of the last successful put for `key`.
    pub(crate) fn data(&self, key: &str) -> Option<Vec<u8>> {
        self.puts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, data)| data.to_vec())
    }
}

impl ObjectStore for RecordingStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(key) {
            return Err(StorageError::operation(format!("rejected {key}")));
        }
        self.puts.lock().unwrap().push((key.to_string(), data));
        Ok(())
    }

    fn container(&self) -> &str {
        "test"
    }
}
