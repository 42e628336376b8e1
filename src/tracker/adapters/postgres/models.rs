//! Diesel row models and their mapping to domain records.

use super::schema::{comments, notifications, projects, task_history, tasks, users};
use crate::tracker::{
    domain::{
        Comment, CommentId, HistoryAction, HistoryEntry, HistoryId, Notification, NotificationId,
        NotificationKind, PersistedTaskData, Project, ProjectId, Role, Task, TaskFields, TaskId,
        TaskPriority, TaskStatus, User, UserId,
    },
    ports::{TrackerStoreError, TrackerStoreResult},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// User row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: Uuid,
    /// Optional display name.
    pub name: Option<String>,
    /// Optional e-mail address.
    pub email: Option<String>,
    /// Authorization role.
    pub role: String,
}

impl UserRow {
    /// Maps the row to a domain user.
    pub fn into_user(self) -> TrackerStoreResult<User> {
        Ok(User {
            id: UserId::from_uuid(self.id),
            name: self.name,
            email: self.email,
            role: Role::try_from(self.role.as_str()).map_err(TrackerStoreError::persistence)?,
        })
    }
}

/// Project row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct ProjectRow {
    /// Project identifier.
    pub id: Uuid,
    /// Project name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Creator and owner.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Project> for ProjectRow {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id().into_inner(),
            name: project.name().to_owned(),
            description: project.description().map(ToOwned::to_owned),
            created_by: project.created_by().into_inner(),
            created_at: project.created_at(),
        }
    }
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self::from_persisted(
            ProjectId::from_uuid(row.id),
            row.name,
            row.description,
            UserId::from_uuid(row.created_by),
            row.created_at,
        )
    }
}

/// Task row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Workflow status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Owning project.
    pub project_id: Uuid,
    /// Optional assignee.
    pub assigned_to: Option<Uuid>,
    /// Creator and owner.
    pub created_by: Uuid,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Estimated effort in hours.
    pub estimated_hours: f64,
    /// Actual effort in hours.
    pub actual_hours: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().into_inner(),
            title: task.title().to_owned(),
            description: task.description().map(ToOwned::to_owned),
            status: task.status().as_str().to_owned(),
            priority: task.priority().as_str().to_owned(),
            project_id: task.project_id().into_inner(),
            assigned_to: task.assigned_to().map(UserId::into_inner),
            created_by: task.created_by().into_inner(),
            due_date: task.due_date(),
            estimated_hours: task.estimated_hours(),
            actual_hours: task.actual_hours(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

impl TaskRow {
    /// Maps the row to a domain task.
    pub fn into_task(self) -> TrackerStoreResult<Task> {
        let status =
            TaskStatus::try_from(self.status.as_str()).map_err(TrackerStoreError::persistence)?;
        let priority = TaskPriority::try_from(self.priority.as_str())
            .map_err(TrackerStoreError::persistence)?;
        Ok(Task::from_persisted(PersistedTaskData {
            id: TaskId::from_uuid(self.id),
            fields: TaskFields {
                title: self.title,
                description: self.description,
                status,
                priority,
                project_id: ProjectId::from_uuid(self.project_id),
                assigned_to: self.assigned_to.map(UserId::from_uuid),
                due_date: self.due_date,
                estimated_hours: self.estimated_hours,
            },
            created_by: UserId::from_uuid(self.created_by),
            actual_hours: self.actual_hours,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

/// Comment row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    /// Comment identifier.
    pub id: Uuid,
    /// Commented task.
    pub task_id: Uuid,
    /// Author.
    pub user_id: Uuid,
    /// Comment body.
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for CommentRow {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.into_inner(),
            task_id: comment.task_id.into_inner(),
            user_id: comment.user_id.into_inner(),
            text: comment.text.clone(),
            created_at: comment.created_at,
        }
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::from_uuid(row.id),
            task_id: TaskId::from_uuid(row.task_id),
            user_id: UserId::from_uuid(row.user_id),
            text: row.text,
            created_at: row.created_at,
        }
    }
}

/// History row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryRow {
    /// Entry identifier.
    pub id: Uuid,
    /// Changed task.
    pub task_id: Uuid,
    /// User who made the change.
    pub user_id: Uuid,
    /// Kind of change.
    pub action: String,
    /// Value before the change.
    pub old_value: String,
    /// Value after the change.
    pub new_value: String,
    /// Time of the change.
    pub timestamp: DateTime<Utc>,
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id.into_inner(),
            task_id: entry.task_id.into_inner(),
            user_id: entry.user_id.into_inner(),
            action: entry.action.as_str().to_owned(),
            old_value: entry.old_value.clone(),
            new_value: entry.new_value.clone(),
            timestamp: entry.timestamp,
        }
    }
}

impl HistoryRow {
    /// Maps the row to a domain history entry.
    pub fn into_entry(self) -> TrackerStoreResult<HistoryEntry> {
        Ok(HistoryEntry {
            id: HistoryId::from_uuid(self.id),
            task_id: TaskId::from_uuid(self.task_id),
            user_id: UserId::from_uuid(self.user_id),
            action: HistoryAction::try_from(self.action.as_str())
                .map_err(TrackerStoreError::persistence)?,
            old_value: self.old_value,
            new_value: self.new_value,
            timestamp: self.timestamp,
        })
    }
}

/// Notification row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    /// Notification identifier.
    pub id: Uuid,
    /// Recipient.
    pub user_id: Uuid,
    /// Display message.
    pub message: String,
    /// Category tag.
    pub kind: String,
    /// Read flag.
    pub read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional idempotency key.
    pub dedupe_key: Option<String>,
}

impl From<&Notification> for NotificationRow {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id.into_inner(),
            user_id: notification.user_id.into_inner(),
            message: notification.message.clone(),
            kind: notification.kind.as_str().to_owned(),
            read: notification.read,
            created_at: notification.created_at,
            dedupe_key: notification.dedupe_key.clone(),
        }
    }
}

impl NotificationRow {
    /// Maps the row to a domain notification.
    pub fn into_notification(self) -> TrackerStoreResult<Notification> {
        Ok(Notification {
            id: NotificationId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            message: self.message,
            kind: NotificationKind::try_from(self.kind.as_str())
                .map_err(TrackerStoreError::persistence)?,
            read: self.read,
            created_at: self.created_at,
            dedupe_key: self.dedupe_key,
        })
    }
}
