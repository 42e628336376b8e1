//! Task mutations: the row write, field history and direct notifications
//! share one transaction.

use super::{
    Resource, TaskDraft, TrackerService, TrackerServiceError, TrackerServiceResult,
    UpdateTaskRequest,
};
use crate::audit::domain::{AuditEvent, EventDetails, EventScope, SystemEventKind};
use crate::tracker::{
    domain::{
        Actor, HistoryEntry, Notification, Task, TaskId, UserId, tracked_changes, update_triggers,
    },
    ports::{AuditTrail, HistoryRecords, NotificationRecords, TaskRecords, TrackerStore},
};
use mockable::Clock;

/// Loads a task the caller created.
fn owned_task<R>(
    records: &mut R,
    task_id: TaskId,
    caller: UserId,
    denial: &'static str,
) -> TrackerServiceResult<Task>
where
    R: TaskRecords + ?Sized,
{
    let task = records
        .find_task(task_id)?
        .ok_or(TrackerServiceError::NotFound(Resource::Task(task_id)))?;
    if !task.is_owned_by(caller) {
        return Err(TrackerServiceError::Forbidden(denial));
    }
    Ok(task)
}

/// Writes one history entry per tracked field that differs.
fn write_field_history<R>(
    records: &mut R,
    before: &Task,
    after: &Task,
    actor: UserId,
    clock: &impl Clock,
) -> TrackerServiceResult<usize>
where
    R: HistoryRecords + ?Sized,
{
    let changes = tracked_changes(before, after);
    let written = changes.len();
    for change in changes {
        records.insert_history(&change.into_entry(after.id(), actor, clock))?;
    }
    Ok(written)
}

/// Writes the assignment and completion notifications for an update.
fn write_update_notifications<R>(
    records: &mut R,
    before: &Task,
    after: &Task,
    clock: &impl Clock,
) -> TrackerServiceResult<()>
where
    R: NotificationRecords + ?Sized,
{
    for trigger in update_triggers(before, after) {
        records.insert_notification(&trigger.notification(after, clock))?;
    }
    Ok(())
}

impl<S, A, C> TrackerService<S, A, C>
where
    S: TrackerStore,
    A: AuditTrail + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a task owned by `actor`.
    ///
    /// Writes a `CREATED` history entry and, when an assignee is given, a
    /// `TASK_ASSIGNED` notification in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Invalid`] for invalid fields,
    /// [`TrackerServiceError::NotFound`] when the project does not exist, or
    /// [`TrackerServiceError::Store`].
    pub async fn create_task(&self, actor: &Actor, draft: TaskDraft) -> TrackerServiceResult<Task> {
        let fields = draft.into_fields()?;
        let caller = actor.id;
        let clock = self.clock.clone();
        let task = self
            .store
            .transaction(move |tx| {
                if tx.find_project(fields.project_id)?.is_none() {
                    return Err(TrackerServiceError::NotFound(Resource::Project(
                        fields.project_id,
                    )));
                }
                let task = Task::create(fields, caller, &*clock);
                tx.insert_task(&task)?;
                tx.insert_history(&HistoryEntry::created(&task, caller, &*clock))?;
                if let Some(assignee) = task.assigned_to() {
                    tx.insert_notification(&Notification::task_assigned(&task, assignee, &*clock))?;
                }
                Ok(task)
            })
            .await?;

        let details = EventDetails::new()
            .with("task_title", task.title())
            .with("priority", task.priority().as_str())
            .with_optional("assigned_to", task.assigned_to().map(|user| user.to_string()));
        self.audit(
            AuditEvent::new(
                SystemEventKind::TaskCreated,
                actor.clone(),
                EventScope::task(Some(task.project_id()), task.id()),
                format!("Created task: {}", task.title()),
            )
            .with_details(details),
        );
        Ok(task)
    }

    /// Replaces the fields of a task created by `actor`.
    ///
    /// Writes one history entry per changed tracked field and the
    /// assignment and completion notifications the change triggers. Either
    /// all of these are stored or none are.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] when the task (or a newly
    /// referenced project) does not exist, [`TrackerServiceError::Forbidden`]
    /// when the caller did not create the task,
    /// [`TrackerServiceError::Invalid`] or [`TrackerServiceError::Store`].
    pub async fn update_task(
        &self,
        actor: &Actor,
        request: UpdateTaskRequest,
    ) -> TrackerServiceResult<Task> {
        let UpdateTaskRequest {
            task_id,
            draft,
            actual_hours,
        } = request;
        let fields = draft.into_fields()?;
        let caller = actor.id;
        let clock = self.clock.clone();
        let (before, after) = self
            .store
            .transaction(move |tx| {
                let mut task = owned_task(
                    &mut *tx,
                    task_id,
                    caller,
                    "You can only update tasks you created",
                )?;
                if fields.project_id != task.project_id()
                    && tx.find_project(fields.project_id)?.is_none()
                {
                    return Err(TrackerServiceError::NotFound(Resource::Project(
                        fields.project_id,
                    )));
                }
                let before = task.clone();
                task.apply(fields, actual_hours, &*clock)?;
                tx.update_task(&task)?;
                write_field_history(&mut *tx, &before, &task, caller, &*clock)?;
                write_update_notifications(&mut *tx, &before, &task, &*clock)?;
                Ok((before, task))
            })
            .await?;

        let details = EventDetails::new()
            .with("task_title", after.title())
            .with("old_status", before.status().as_str())
            .with("new_status", after.status().as_str())
            .with("old_priority", before.priority().as_str())
            .with("new_priority", after.priority().as_str());
        self.audit(
            AuditEvent::new(
                SystemEventKind::TaskUpdated,
                actor.clone(),
                EventScope::task(Some(after.project_id()), after.id()),
                format!("Updated task: {}", after.title()),
            )
            .with_details(details),
        );
        Ok(after)
    }

    /// Deletes a task created by `actor` with its comments and history.
    ///
    /// A `DELETED` history entry is written first; the cascade removes it
    /// together with the rest of the task history, so the durable record of
    /// the deletion is the `TASK_DELETED` system event.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`],
    /// [`TrackerServiceError::Forbidden`] when the caller did not create the
    /// task, or [`TrackerServiceError::Store`].
    pub async fn delete_task(&self, actor: &Actor, task_id: TaskId) -> TrackerServiceResult<TaskId> {
        let caller = actor.id;
        let clock = self.clock.clone();
        let task = self
            .store
            .transaction(move |tx| {
                let task = owned_task(
                    &mut *tx,
                    task_id,
                    caller,
                    "You can only delete tasks you created",
                )?;
                tx.insert_history(&HistoryEntry::deleted(&task, caller, &*clock))?;
                tx.delete_task(task_id)?;
                Ok::<_, TrackerServiceError>(task)
            })
            .await?;

        self.audit(
            AuditEvent::new(
                SystemEventKind::TaskDeleted,
                actor.clone(),
                EventScope::task(Some(task.project_id()), task_id),
                format!("Deleted task: {}", task.title()),
            )
            .with_details(EventDetails::new().with("task_title", task.title())),
        );
        Ok(task_id)
    }

    /// Lists the history of a task in ascending timestamp order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] when the task does not exist
    /// or [`TrackerServiceError::Store`].
    pub async fn task_history(&self, task_id: TaskId) -> TrackerServiceResult<Vec<HistoryEntry>> {
        self.store
            .transaction(move |tx| {
                if tx.find_task(task_id)?.is_none() {
                    return Err(TrackerServiceError::NotFound(Resource::Task(task_id)));
                }
                Ok(tx.history_for_task(task_id)?)
            })
            .await
    }
}
