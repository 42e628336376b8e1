//! Fan-out of one system event to every administrator.

use crate::audit::{
    domain::{AlertRenderer, MessageStyle, SystemEvent, alert_notification_kind},
    ports::AdminInbox,
};
use crate::tracker::domain::{Notification, User};
use mockable::Clock;
use std::sync::Arc;

/// Result of one fan-out attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOutOutcome {
    /// Notifications were handed to the inbox.
    Delivered {
        /// Number of administrators addressed.
        recipients: usize,
        /// Rows actually inserted; lower than `recipients` when some already
        /// existed.
        inserted: usize,
    },
    /// No administrator exists; nothing was written.
    NoAdmins,
    /// Looking up administrators or inserting notifications failed.
    Failed,
}

impl FanOutOutcome {
    /// Returns `true` unless the attempt failed.
    #[must_use]
    pub const fn succeeded(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Idempotency key shared by every alert for `event` sent to `admin`.
#[must_use]
pub fn alert_dedupe_key(event: &SystemEvent, admin: &User) -> String {
    format!("system-event:{}:{}", event.id, admin.id)
}

/// Translates system events into one notification per administrator.
pub struct AdminNotifier<I, C>
where
    I: AdminInbox + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    inbox: Arc<I>,
    renderer: Arc<AlertRenderer>,
    clock: Arc<C>,
}

impl<I, C> Clone for AdminNotifier<I, C>
where
    I: AdminInbox + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inbox: Arc::clone(&self.inbox),
            renderer: Arc::clone(&self.renderer),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<I, C> AdminNotifier<I, C>
where
    I: AdminInbox + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a notifier writing to `inbox`.
    #[must_use]
    pub const fn new(inbox: Arc<I>, renderer: Arc<AlertRenderer>, clock: Arc<C>) -> Self {
        Self {
            inbox,
            renderer,
            clock,
        }
    }

    /// Notifies every administrator about `event`.
    ///
    /// Failures are logged and reported through the outcome; this never
    /// returns an error.
    pub async fn notify(&self, event: &SystemEvent, style: MessageStyle) -> FanOutOutcome {
        let admins = match self.inbox.list_admins().await {
            Ok(admins) => admins,
            Err(err) => {
                tracing::warn!(event_id = %event.id, error = %err, "failed to list administrators");
                return FanOutOutcome::Failed;
            }
        };
        if admins.is_empty() {
            tracing::debug!(event_id = %event.id, "no administrators to notify");
            return FanOutOutcome::NoAdmins;
        }

        let message = self.renderer.render(event, style);
        let kind = alert_notification_kind(event.kind);
        let batch: Vec<Notification> = admins
            .iter()
            .map(|admin| {
                Notification::new(admin.id, message.clone(), kind, &*self.clock)
                    .with_dedupe_key(alert_dedupe_key(event, admin))
            })
            .collect();

        match self.inbox.deliver(&batch).await {
            Ok(inserted) => {
                tracing::debug!(
                    event_id = %event.id,
                    recipients = batch.len(),
                    inserted,
                    "administrators notified"
                );
                FanOutOutcome::Delivered {
                    recipients: batch.len(),
                    inserted,
                }
            }
            Err(err) => {
                tracing::warn!(event_id = %event.id, error = %err, "failed to deliver admin alerts");
                FanOutOutcome::Failed
            }
        }
    }
}
