//! Tracker service: transactional mutations with post-commit auditing.

use crate::audit::domain::AuditEvent;
use crate::tracker::ports::{AuditTrail, TrackerStore};
use mockable::Clock;
use std::sync::Arc;

/// Orchestrates project, task, comment and notification mutations.
///
/// Each mutation runs in one store transaction that writes the row, its
/// history entries and its direct notifications together. The audit event is
/// submitted only after the transaction committed.
pub struct TrackerService<S, A, C>
where
    S: TrackerStore,
    A: AuditTrail + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    pub(super) store: Arc<S>,
    audit: Arc<A>,
    pub(super) clock: Arc<C>,
}

impl<S, A, C> Clone for TrackerService<S, A, C>
where
    S: TrackerStore,
    A: AuditTrail + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            audit: Arc::clone(&self.audit),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, A, C> TrackerService<S, A, C>
where
    S: TrackerStore,
    A: AuditTrail + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new tracker service.
    #[must_use]
    pub const fn new(store: Arc<S>, audit: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            store,
            audit,
            clock,
        }
    }

    pub(super) fn audit(&self, event: AuditEvent) {
        self.audit.submit(event);
    }
}
