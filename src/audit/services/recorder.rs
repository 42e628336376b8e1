//! Durable recording of audit events followed by an immediate fan-out.

use super::{AdminNotifier, FanOutOutcome};
use crate::audit::{
    domain::{AuditEvent, MessageStyle, SystemEvent, SystemEventId},
    ports::{AdminInbox, SystemEventStore},
};
use crate::tracker::ports::AuditTrail;
use mockable::Clock;
use std::sync::Arc;
use tokio::runtime::Handle;

/// What happened to one recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The event could not be stored and is lost.
    Dropped,
    /// The event is stored but still unprocessed; the sweep will pick it up.
    PendingSweep(SystemEventId),
    /// The event is stored and marked processed.
    Processed(SystemEventId),
}

/// Appends system events and notifies administrators right away.
pub struct EventRecorder<S, I, C>
where
    S: SystemEventStore + ?Sized,
    I: AdminInbox + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    notifier: AdminNotifier<I, C>,
    clock: Arc<C>,
}

impl<S, I, C> Clone for EventRecorder<S, I, C>
where
    S: SystemEventStore + ?Sized,
    I: AdminInbox + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: self.notifier.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, I, C> EventRecorder<S, I, C>
where
    S: SystemEventStore + ?Sized,
    I: AdminInbox + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a recorder.
    #[must_use]
    pub const fn new(store: Arc<S>, notifier: AdminNotifier<I, C>, clock: Arc<C>) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    /// Stores `event` and attempts the immediate admin fan-out.
    ///
    /// The stored row is marked processed only when the fan-out did not
    /// fail. Every failure is logged; none is returned.
    pub async fn record(&self, event: AuditEvent) -> RecordOutcome {
        let pending = SystemEvent::pending(event, &*self.clock);
        if let Err(err) = self.store.append(&pending).await {
            tracing::error!(
                event_id = %pending.id,
                kind = %pending.kind,
                error = %err,
                "failed to record system event"
            );
            return RecordOutcome::Dropped;
        }

        let outcome = self.notifier.notify(&pending, MessageStyle::Localized).await;
        if outcome == FanOutOutcome::Failed {
            tracing::warn!(event_id = %pending.id, "immediate notification failed; left for sweep");
            return RecordOutcome::PendingSweep(pending.id);
        }

        match self
            .store
            .mark_processed(&[pending.id], self.clock.utc())
            .await
        {
            Ok(_) => RecordOutcome::Processed(pending.id),
            Err(err) => {
                tracing::warn!(
                    event_id = %pending.id,
                    error = %err,
                    "failed to mark system event processed; left for sweep"
                );
                RecordOutcome::PendingSweep(pending.id)
            }
        }
    }
}

impl<S, I, C> AuditTrail for EventRecorder<S, I, C>
where
    S: SystemEventStore + ?Sized + 'static,
    I: AdminInbox + ?Sized + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Records the event on a detached task.
    ///
    /// A supervising task logs a panic inside the recorder. Without a tokio
    /// runtime the event is logged and dropped.
    fn submit(&self, event: AuditEvent) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::error!(
                kind = %event.kind,
                action = %event.action,
                "no async runtime available; system event dropped"
            );
            return;
        };
        let recorder = self.clone();
        let worker = runtime.spawn(async move { recorder.record(event).await });
        runtime.spawn(async move {
            if let Err(err) = worker.await {
                tracing::error!(error = %err, "system event recorder task failed");
            }
        });
    }
}
