//! Comment mutations and the per-task comment listing.

use super::{AddCommentRequest, Resource, TrackerService, TrackerServiceError, TrackerServiceResult};
use crate::audit::domain::{AuditEvent, EventDetails, EventScope, SystemEventKind};
use crate::tracker::{
    domain::{Actor, Comment, CommentId, Notification, TaskId},
    ports::{AuditTrail, CommentRecords, NotificationRecords, TaskRecords, TrackerStore},
};
use mockable::Clock;

impl<S, A, C> TrackerService<S, A, C>
where
    S: TrackerStore,
    A: AuditTrail + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    /// Posts a comment on a task.
    ///
    /// The task assignee receives a `COMMENT_ADDED` notification unless they
    /// wrote the comment themselves.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Invalid`] for empty or oversized text,
    /// [`TrackerServiceError::NotFound`] when the task does not exist, or
    /// [`TrackerServiceError::Store`].
    pub async fn add_comment(
        &self,
        actor: &Actor,
        request: AddCommentRequest,
    ) -> TrackerServiceResult<Comment> {
        let comment = Comment::new(request.task_id, actor.id, &request.text, &*self.clock)?;
        let stored = comment.clone();
        let clock = self.clock.clone();
        let task = self
            .store
            .transaction(move |tx| {
                let task = tx
                    .find_task(stored.task_id)?
                    .ok_or(TrackerServiceError::NotFound(Resource::Task(stored.task_id)))?;
                tx.insert_comment(&stored)?;
                if let Some(assignee) = task.assigned_to().filter(|user| *user != stored.user_id) {
                    tx.insert_notification(&Notification::comment_added(&task, assignee, &*clock))?;
                }
                Ok::<_, TrackerServiceError>(task)
            })
            .await?;

        let details = EventDetails::new()
            .with("comment", comment.excerpt())
            .with("task_title", task.title());
        self.audit(
            AuditEvent::new(
                SystemEventKind::CommentAdded,
                actor.clone(),
                EventScope::task(Some(task.project_id()), task.id()),
                format!("Added comment to task: {}", task.title()),
            )
            .with_details(details),
        );
        Ok(comment)
    }

    /// Deletes a comment.
    ///
    /// Allowed for the comment author and for the creator of the commented
    /// task. No audit event is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`],
    /// [`TrackerServiceError::Forbidden`] or [`TrackerServiceError::Store`].
    pub async fn delete_comment(
        &self,
        actor: &Actor,
        comment_id: CommentId,
    ) -> TrackerServiceResult<CommentId> {
        let caller = actor.id;
        self.store
            .transaction(move |tx| {
                let comment = tx
                    .find_comment(comment_id)?
                    .ok_or(TrackerServiceError::NotFound(Resource::Comment(comment_id)))?;
                let task_owner = tx
                    .find_task(comment.task_id)?
                    .is_some_and(|task| task.is_owned_by(caller));
                if comment.user_id != caller && !task_owner {
                    return Err(TrackerServiceError::Forbidden(
                        "You can only delete your own comments or comments on your tasks",
                    ));
                }
                tx.delete_comment(comment_id)?;
                Ok(comment_id)
            })
            .await
    }

    /// Lists the comments on a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] when the task does not exist
    /// or [`TrackerServiceError::Store`].
    pub async fn task_comments(&self, task_id: TaskId) -> TrackerServiceResult<Vec<Comment>> {
        self.store
            .transaction(move |tx| {
                if tx.find_task(task_id)?.is_none() {
                    return Err(TrackerServiceError::NotFound(Resource::Task(task_id)));
                }
                Ok(tx.comments_for_task(task_id)?)
            })
            .await
    }
}
