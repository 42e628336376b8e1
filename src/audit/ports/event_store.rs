//! Durable storage of system events.

use crate::audit::domain::{SystemEvent, SystemEventId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for audit store operations.
pub type AuditStoreResult<T> = Result<T, AuditStoreError>;

/// Errors returned by audit store implementations.
#[derive(Debug, Clone, Error)]
pub enum AuditStoreError {
    /// An event with the same identifier already exists.
    #[error("duplicate system event: {0}")]
    Duplicate(SystemEventId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuditStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Append-mostly log of system events.
#[async_trait]
pub trait SystemEventStore: Send + Sync {
    /// Appends a new, unprocessed event.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError`] when the insert fails.
    async fn append(&self, event: &SystemEvent) -> AuditStoreResult<()>;

    /// Finds an event by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError`] when the lookup fails.
    async fn find_by_id(&self, id: SystemEventId) -> AuditStoreResult<Option<SystemEvent>>;

    /// Returns up to `limit` unprocessed events, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError`] when the query fails.
    async fn fetch_unprocessed(&self, limit: usize) -> AuditStoreResult<Vec<SystemEvent>>;

    /// Marks the given events processed at `at` in one bulk update.
    ///
    /// Events already processed keep their original `processed_at`. Returns
    /// the number of events changed.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError`] when the update fails.
    async fn mark_processed(
        &self,
        ids: &[SystemEventId],
        at: DateTime<Utc>,
    ) -> AuditStoreResult<usize>;
}
