//! Administrator lookup and bulk notification delivery.

use super::AuditStoreResult;
use crate::tracker::domain::{Notification, User};
use async_trait::async_trait;

/// Recipients of system event notifications.
#[async_trait]
pub trait AdminInbox: Send + Sync {
    /// Lists every user with the administrator role.
    ///
    /// # Errors
    ///
    /// Returns [`super::AuditStoreError`] when the query fails.
    async fn list_admins(&self) -> AuditStoreResult<Vec<User>>;

    /// Inserts notifications in bulk.
    ///
    /// Rows whose identifier or dedupe key already exists are skipped.
    /// Returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns [`super::AuditStoreError`] when the insert fails; no row is
    /// stored in that case.
    async fn deliver(&self, notifications: &[Notification]) -> AuditStoreResult<usize>;
}
