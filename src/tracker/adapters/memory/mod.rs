//! In-memory tracker store for tests and local runs.
//!
//! A transaction works on a copy of the tables and swaps it in on success,
//! which gives the same all-or-nothing behaviour as a database transaction.

mod records;

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::tracker::{
    domain::{Comment, HistoryEntry, Notification, Project, Task, User, UserId},
    ports::{TrackerStore, TrackerStoreError, TrackerStoreResult, TrackerTransaction},
};
pub(crate) use records::TrackerTables;
use records::MemoryTransaction;

/// Failure switches used to exercise rollback paths.
#[derive(Debug, Default)]
pub(crate) struct FaultSwitches {
    pub(crate) notification_writes: AtomicBool,
    pub(crate) history_writes: AtomicBool,
}

/// Thread-safe in-memory tracker store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrackerStore {
    state: Arc<Mutex<TrackerTables>>,
    faults: Arc<FaultSwitches>,
}

impl InMemoryTrackerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> TrackerStoreResult<MutexGuard<'_, TrackerTables>> {
        self.state
            .lock()
            .map_err(|err| TrackerStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    /// Registers a user.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Duplicate`] when the user already exists.
    pub fn add_user(&self, user: User) -> TrackerStoreResult<()> {
        let mut tables = self.lock()?;
        if tables.users.contains_key(&user.id) {
            return Err(TrackerStoreError::duplicate("users", user.id));
        }
        tables.users.insert(user.id, user);
        Ok(())
    }

    /// Makes every subsequent notification insert fail until switched off.
    pub fn fail_notification_writes(&self, enabled: bool) {
        self.faults
            .notification_writes
            .store(enabled, Ordering::SeqCst);
    }

    /// Makes every subsequent history insert fail until switched off.
    pub fn fail_history_writes(&self, enabled: bool) {
        self.faults.history_writes.store(enabled, Ordering::SeqCst);
    }

    /// Returns a copy of every stored project.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Persistence`] when the lock is poisoned.
    pub fn projects(&self) -> TrackerStoreResult<Vec<Project>> {
        Ok(self.lock()?.projects.values().cloned().collect())
    }

    /// Returns a copy of every stored task.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Persistence`] when the lock is poisoned.
    pub fn tasks(&self) -> TrackerStoreResult<Vec<Task>> {
        Ok(self.lock()?.tasks.values().cloned().collect())
    }

    /// Returns every stored comment in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Persistence`] when the lock is poisoned.
    pub fn comments(&self) -> TrackerStoreResult<Vec<Comment>> {
        Ok(self.lock()?.comments.clone())
    }

    /// Returns every history entry in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Persistence`] when the lock is poisoned.
    pub fn history(&self) -> TrackerStoreResult<Vec<HistoryEntry>> {
        Ok(self.lock()?.history.clone())
    }

    /// Returns every notification addressed to `user` in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Persistence`] when the lock is poisoned.
    pub fn notifications_to(&self, user: UserId) -> TrackerStoreResult<Vec<Notification>> {
        Ok(self
            .lock()?
            .notifications
            .iter()
            .filter(|notification| notification.user_id == user)
            .cloned()
            .collect())
    }

    /// Returns every notification in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Persistence`] when the lock is poisoned.
    pub fn notifications(&self) -> TrackerStoreResult<Vec<Notification>> {
        Ok(self.lock()?.notifications.clone())
    }
}

#[async_trait]
impl TrackerStore for InMemoryTrackerStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TrackerTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TrackerStoreError> + Send + 'static,
    {
        let mut committed = self.lock()?;
        let mut working = committed.clone();
        let value = {
            let mut tx = MemoryTransaction::new(&mut working, &self.faults);
            work(&mut tx)?
        };
        *committed = working;
        Ok(value)
    }
}
