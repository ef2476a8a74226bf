//! Application state

use std::sync::Arc;

use tasky_core::{FileTaskRepository, TaskService};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Shared application state.
///
/// The service sits behind one mutex so requests run one at a time; the core
/// does no locking of its own.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<TaskService<FileTaskRepository>>>,
}

impl AppState {
    pub fn new(service: TaskService<FileTaskRepository>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    /// Exclusive access to the task service. The guard is owned so it can
    /// move onto a blocking thread with the file I/O.
    pub async fn lock(&self) -> OwnedMutexGuard<TaskService<FileTaskRepository>> {
        self.inner.clone().lock_owned().await
    }
}
