//! In-memory event store and admin inbox.
//!
//! Admins and notifications live in the shared [`InMemoryTrackerStore`] so
//! that alerts land next to the notifications written by tracker mutations.

use crate::audit::{
    domain::{SystemEvent, SystemEventId},
    ports::{AdminInbox, AuditStoreError, AuditStoreResult, SystemEventStore},
};
use crate::tracker::{
    adapters::memory::InMemoryTrackerStore,
    domain::{Notification, Role, User},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct AuditFaults {
    append: AtomicBool,
    deliver: AtomicBool,
    mark: AtomicBool,
}

/// Thread-safe in-memory audit store.
#[derive(Debug, Clone)]
pub struct InMemoryAuditStore {
    events: Arc<Mutex<Vec<SystemEvent>>>,
    tracker: InMemoryTrackerStore,
    faults: Arc<AuditFaults>,
}

fn injected(operation: &str) -> AuditStoreError {
    AuditStoreError::persistence(std::io::Error::other(format!(
        "injected failure: {operation}"
    )))
}

impl InMemoryAuditStore {
    /// Creates an empty event log over the users and notifications of
    /// `tracker`.
    #[must_use]
    pub fn new(tracker: InMemoryTrackerStore) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            tracker,
            faults: Arc::new(AuditFaults::default()),
        }
    }

    fn lock(&self) -> AuditStoreResult<MutexGuard<'_, Vec<SystemEvent>>> {
        self.events
            .lock()
            .map_err(|err| AuditStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    /// Makes event appends fail until switched off.
    pub fn fail_appends(&self, enabled: bool) {
        self.faults.append.store(enabled, Ordering::SeqCst);
    }

    /// Makes notification delivery fail until switched off.
    pub fn fail_deliveries(&self, enabled: bool) {
        self.faults.deliver.store(enabled, Ordering::SeqCst);
    }

    /// Makes processed-marking fail until switched off.
    pub fn fail_marking(&self, enabled: bool) {
        self.faults.mark.store(enabled, Ordering::SeqCst);
    }

    /// Returns every stored event in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError::Persistence`] when the lock is poisoned.
    pub fn events(&self) -> AuditStoreResult<Vec<SystemEvent>> {
        Ok(self.lock()?.clone())
    }
}

#[async_trait]
impl SystemEventStore for InMemoryAuditStore {
    async fn append(&self, event: &SystemEvent) -> AuditStoreResult<()> {
        if self.faults.append.load(Ordering::SeqCst) {
            return Err(injected("append system event"));
        }
        let mut events = self.lock()?;
        if events.iter().any(|existing| existing.id == event.id) {
            return Err(AuditStoreError::Duplicate(event.id));
        }
        events.push(event.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: SystemEventId) -> AuditStoreResult<Option<SystemEvent>> {
        Ok(self.lock()?.iter().find(|event| event.id == id).cloned())
    }

    async fn fetch_unprocessed(&self, limit: usize) -> AuditStoreResult<Vec<SystemEvent>> {
        let mut pending: Vec<SystemEvent> = self
            .lock()?
            .iter()
            .filter(|event| !event.processed)
            .cloned()
            .collect();
        pending.sort_by_key(|event| event.created_at);
        pending.truncate(limit);
        Ok(pending)
    }

    async fn mark_processed(
        &self,
        ids: &[SystemEventId],
        at: DateTime<Utc>,
    ) -> AuditStoreResult<usize> {
        if self.faults.mark.load(Ordering::SeqCst) {
            return Err(injected("mark system events processed"));
        }
        let mut events = self.lock()?;
        let mut changed = 0;
        for event in events
            .iter_mut()
            .filter(|event| !event.processed && ids.contains(&event.id))
        {
            event.processed = true;
            event.processed_at = Some(at);
            changed += 1;
        }
        Ok(changed)
    }
}

#[async_trait]
impl AdminInbox for InMemoryAuditStore {
    async fn list_admins(&self) -> AuditStoreResult<Vec<User>> {
        let tables = self
            .tracker
            .lock()
            .map_err(AuditStoreError::persistence)?;
        let mut admins: Vec<User> = tables
            .users
            .values()
            .filter(|user| user.role == Role::Admin)
            .cloned()
            .collect();
        admins.sort_by_key(|user| user.id);
        Ok(admins)
    }

    async fn deliver(&self, notifications: &[Notification]) -> AuditStoreResult<usize> {
        if self.faults.deliver.load(Ordering::SeqCst) {
            return Err(injected("deliver notifications"));
        }
        let mut tables = self
            .tracker
            .lock()
            .map_err(AuditStoreError::persistence)?;
        let mut inserted = 0;
        for notification in notifications {
            if tables.has_notification_conflict(notification) {
                continue;
            }
            tables.notifications.push(notification.clone());
            inserted += 1;
        }
        Ok(inserted)
    }
}
