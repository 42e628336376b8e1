//! System events: the immutable audit record of each mutation.

use super::{EventDetails, ParseSystemEventKindError};
use crate::tracker::domain::{Actor, ProjectId, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a system event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemEventId(Uuid);

impl SystemEventId {
    /// Creates a new random event identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SystemEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SystemEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Audited mutation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemEventKind {
    /// A project was created.
    ProjectCreated,
    /// A project was renamed or re-described.
    ProjectUpdated,
    /// A project and its tasks were deleted.
    ProjectDeleted,
    /// A task was created.
    TaskCreated,
    /// A task was updated.
    TaskUpdated,
    /// A task was deleted.
    TaskDeleted,
    /// A comment was added to a task.
    CommentAdded,
}

impl SystemEventKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectCreated => "PROJECT_CREATED",
            Self::ProjectUpdated => "PROJECT_UPDATED",
            Self::ProjectDeleted => "PROJECT_DELETED",
            Self::TaskCreated => "TASK_CREATED",
            Self::TaskUpdated => "TASK_UPDATED",
            Self::TaskDeleted => "TASK_DELETED",
            Self::CommentAdded => "COMMENT_ADDED",
        }
    }
}

impl TryFrom<&str> for SystemEventKind {
    type Error = ParseSystemEventKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PROJECT_CREATED" => Ok(Self::ProjectCreated),
            "PROJECT_UPDATED" => Ok(Self::ProjectUpdated),
            "PROJECT_DELETED" => Ok(Self::ProjectDeleted),
            "TASK_CREATED" => Ok(Self::TaskCreated),
            "TASK_UPDATED" => Ok(Self::TaskUpdated),
            "TASK_DELETED" => Ok(Self::TaskDeleted),
            "COMMENT_ADDED" => Ok(Self::CommentAdded),
            _ => Err(ParseSystemEventKindError(value.to_owned())),
        }
    }
}

impl fmt::Display for SystemEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project and task an event refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventScope {
    /// Affected project, if any.
    pub project_id: Option<ProjectId>,
    /// Affected task, if any.
    pub task_id: Option<TaskId>,
}

impl EventScope {
    /// Scope of a project-level event.
    #[must_use]
    pub const fn project(project_id: ProjectId) -> Self {
        Self {
            project_id: Some(project_id),
            task_id: None,
        }
    }

    /// Scope of a task-level event.
    #[must_use]
    pub const fn task(project_id: Option<ProjectId>, task_id: TaskId) -> Self {
        Self {
            project_id,
            task_id: Some(task_id),
        }
    }
}

/// Request to record an audit event for a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Mutation type.
    pub kind: SystemEventKind,
    /// Caller that performed the mutation.
    pub actor: Actor,
    /// Affected project and task.
    pub scope: EventScope,
    /// Human readable description of the mutation.
    pub action: String,
    /// Free-form payload.
    pub details: EventDetails,
}

impl AuditEvent {
    /// Creates an audit event with an empty payload.
    #[must_use]
    pub fn new(
        kind: SystemEventKind,
        actor: Actor,
        scope: EventScope,
        action: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            actor,
            scope,
            action: action.into(),
            details: EventDetails::new(),
        }
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_details(mut self, details: EventDetails) -> Self {
        self.details = details;
        self
    }
}

/// Stored audit event awaiting admin notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemEvent {
    /// Event identifier.
    pub id: SystemEventId,
    /// Mutation type.
    pub kind: SystemEventKind,
    /// Acting user.
    pub user_id: UserId,
    /// Acting user's display name at the time of the event.
    pub user_name: Option<String>,
    /// Affected project, if any.
    pub project_id: Option<ProjectId>,
    /// Affected task, if any.
    pub task_id: Option<TaskId>,
    /// Human readable description of the mutation.
    pub action: String,
    /// Free-form payload.
    pub details: EventDetails,
    /// Whether admins have been notified.
    pub processed: bool,
    /// When the event was marked processed.
    pub processed_at: Option<DateTime<Utc>>,
    /// Creation timestamp; defines sweep order.
    pub created_at: DateTime<Utc>,
}

impl SystemEvent {
    /// Creates an unprocessed event from an audit request.
    #[must_use]
    pub fn pending(event: AuditEvent, clock: &impl Clock) -> Self {
        let AuditEvent {
            kind,
            actor,
            scope,
            action,
            details,
        } = event;
        Self {
            id: SystemEventId::new(),
            kind,
            user_id: actor.id,
            user_name: Some(actor.display_name),
            project_id: scope.project_id,
            task_id: scope.task_id,
            action,
            details,
            processed: false,
            processed_at: None,
            created_at: clock.utc(),
        }
    }
}
