//! Batch sweep over unprocessed system events.

use super::{AdminNotifier, FanOutOutcome};
use crate::audit::{
    domain::{MessageStyle, SystemEventId},
    ports::{AdminInbox, SystemEventStore},
};
use mockable::Clock;
use std::sync::Arc;

const MIN_BATCH_SIZE: usize = 1;

/// Counters for one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Unprocessed events fetched.
    pub fetched: usize,
    /// Events whose fan-out failed.
    pub failed: usize,
    /// Events marked processed.
    pub marked: usize,
}

/// Notifies administrators about events the immediate path left behind.
pub struct EventProcessor<S, I, C>
where
    S: SystemEventStore + ?Sized,
    I: AdminInbox + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    notifier: AdminNotifier<I, C>,
    clock: Arc<C>,
    batch_size: usize,
}

impl<S, I, C> EventProcessor<S, I, C>
where
    S: SystemEventStore + ?Sized,
    I: AdminInbox + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a processor handling at most `batch_size` events per pass.
    ///
    /// A batch size of zero is raised to one so every pass makes progress.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        notifier: AdminNotifier<I, C>,
        clock: Arc<C>,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            batch_size: batch_size.max(MIN_BATCH_SIZE),
        }
    }

    /// Runs one sweep pass.
    ///
    /// Fetches the oldest unprocessed events, notifies administrators for
    /// each one independently, then marks every fetched event processed in
    /// a single update, including those whose fan-out failed. With nothing
    /// to do, nothing is written.
    pub async fn run_once(&self) -> SweepReport {
        let events = match self.store.fetch_unprocessed(self.batch_size).await {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch unprocessed system events");
                return SweepReport::default();
            }
        };
        if events.is_empty() {
            return SweepReport::default();
        }

        let mut report = SweepReport {
            fetched: events.len(),
            ..SweepReport::default()
        };
        for event in &events {
            if self.notifier.notify(event, MessageStyle::SweepDigest).await == FanOutOutcome::Failed
            {
                tracing::warn!(event_id = %event.id, "sweep notification failed; marking anyway");
                report.failed += 1;
            }
        }

        let ids: Vec<SystemEventId> = events.iter().map(|event| event.id).collect();
        match self.store.mark_processed(&ids, self.clock.utc()).await {
            Ok(marked) => report.marked = marked,
            Err(err) => {
                tracing::error!(
                    fetched = report.fetched,
                    error = %err,
                    "failed to mark swept system events processed"
                );
            }
        }
        tracing::info!(
            fetched = report.fetched,
            failed = report.failed,
            marked = report.marked,
            "system event sweep finished"
        );
        report
    }
}
