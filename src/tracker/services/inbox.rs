//! Recipient-facing notification operations.

use super::{Resource, TrackerService, TrackerServiceError, TrackerServiceResult};
use crate::tracker::{
    domain::{Notification, NotificationId, UserId},
    ports::{AuditTrail, NotificationRecords, TrackerStore},
};
use mockable::Clock;

/// Loads a notification addressed to `recipient`.
fn own_notification<R>(
    records: &mut R,
    id: NotificationId,
    recipient: UserId,
    denial: &'static str,
) -> TrackerServiceResult<Notification>
where
    R: NotificationRecords + ?Sized,
{
    let notification = records
        .find_notification(id)?
        .ok_or(TrackerServiceError::NotFound(Resource::Notification(id)))?;
    if notification.user_id != recipient {
        return Err(TrackerServiceError::Forbidden(denial));
    }
    Ok(notification)
}

impl<S, A, C> TrackerService<S, A, C>
where
    S: TrackerStore,
    A: AuditTrail + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    /// Lists the unread notifications of `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Store`] when the query fails.
    pub async fn unread_notifications(
        &self,
        user: UserId,
    ) -> TrackerServiceResult<Vec<Notification>> {
        self.store
            .transaction(move |tx| Ok::<_, TrackerServiceError>(tx.notifications_for(user, true)?))
            .await
    }

    /// Counts the unread notifications of `user`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Store`] when the query fails.
    pub async fn unread_notification_count(&self, user: UserId) -> TrackerServiceResult<usize> {
        self.store
            .transaction(move |tx| Ok::<_, TrackerServiceError>(tx.count_unread(user)?))
            .await
    }

    /// Marks one notification of `user` as read.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`],
    /// [`TrackerServiceError::Forbidden`] when it belongs to someone else, or
    /// [`TrackerServiceError::Store`].
    pub async fn mark_notification_read(
        &self,
        user: UserId,
        id: NotificationId,
    ) -> TrackerServiceResult<()> {
        self.store
            .transaction(move |tx| {
                own_notification(
                    &mut *tx,
                    id,
                    user,
                    "You can only update your own notifications",
                )?;
                tx.mark_notification_read(id)?;
                Ok::<_, TrackerServiceError>(())
            })
            .await
    }

    /// Marks every unread notification of `user` as read.
    ///
    /// Returns the number of notifications changed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Store`] when the update fails.
    pub async fn mark_all_notifications_read(&self, user: UserId) -> TrackerServiceResult<usize> {
        self.store
            .transaction(move |tx| Ok::<_, TrackerServiceError>(tx.mark_all_read(user)?))
            .await
    }

    /// Deletes one notification of `user`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`],
    /// [`TrackerServiceError::Forbidden`] when it belongs to someone else, or
    /// [`TrackerServiceError::Store`].
    pub async fn delete_notification(
        &self,
        user: UserId,
        id: NotificationId,
    ) -> TrackerServiceResult<()> {
        self.store
            .transaction(move |tx| {
                own_notification(
                    &mut *tx,
                    id,
                    user,
                    "You can only delete your own notifications",
                )?;
                tx.delete_notification(id)?;
                Ok::<_, TrackerServiceError>(())
            })
            .await
    }
}
