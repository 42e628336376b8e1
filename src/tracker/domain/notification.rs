//! User notifications and the rules that trigger them on task changes.

use super::{NotificationId, ParseTrackerValueError, Task, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Category tag carried by a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// A task was assigned or reassigned to the recipient.
    TaskAssigned,
    /// A task assigned to the recipient was completed.
    TaskCompleted,
    /// A comment was added; also the bucket for unmapped system events.
    CommentAdded,
    /// A project was created.
    ProjectCreated,
    /// A project was deleted.
    ProjectDeleted,
    /// A task was created.
    TaskCreated,
    /// A task was deleted.
    TaskDeleted,
    /// A task was updated.
    TaskStatusChanged,
}

impl NotificationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskAssigned => "TASK_ASSIGNED",
            Self::TaskCompleted => "TASK_COMPLETED",
            Self::CommentAdded => "COMMENT_ADDED",
            Self::ProjectCreated => "PROJECT_CREATED",
            Self::ProjectDeleted => "PROJECT_DELETED",
            Self::TaskCreated => "TASK_CREATED",
            Self::TaskDeleted => "TASK_DELETED",
            Self::TaskStatusChanged => "TASK_STATUS_CHANGED",
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = ParseTrackerValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TASK_ASSIGNED" => Ok(Self::TaskAssigned),
            "TASK_COMPLETED" => Ok(Self::TaskCompleted),
            "COMMENT_ADDED" => Ok(Self::CommentAdded),
            "PROJECT_CREATED" => Ok(Self::ProjectCreated),
            "PROJECT_DELETED" => Ok(Self::ProjectDeleted),
            "TASK_CREATED" => Ok(Self::TaskCreated),
            "TASK_DELETED" => Ok(Self::TaskDeleted),
            "TASK_STATUS_CHANGED" => Ok(Self::TaskStatusChanged),
            _ => Err(ParseTrackerValueError::new("notification kind", value)),
        }
    }
}

/// Notification delivered to a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification identifier.
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    /// Display message.
    pub message: String,
    /// Category tag.
    pub kind: NotificationKind,
    /// Whether the recipient has read it.
    pub read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional idempotency key; unique across notifications when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedupe_key: Option<String>,
}

impl Notification {
    /// Creates an unread notification.
    #[must_use]
    pub fn new(
        recipient: UserId,
        message: impl Into<String>,
        kind: NotificationKind,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            user_id: recipient,
            message: message.into(),
            kind,
            read: false,
            created_at: clock.utc(),
            dedupe_key: None,
        }
    }

    /// Sets the idempotency key.
    #[must_use]
    pub fn with_dedupe_key(mut self, key: impl Into<String>) -> Self {
        self.dedupe_key = Some(key.into());
        self
    }

    /// Notification for a task assigned at creation time.
    #[must_use]
    pub fn task_assigned(task: &Task, recipient: UserId, clock: &impl Clock) -> Self {
        Self::new(
            recipient,
            format!("New task assigned: {}", task.title()),
            NotificationKind::TaskAssigned,
            clock,
        )
    }

    /// Notification for the assignee of a commented task.
    #[must_use]
    pub fn comment_added(task: &Task, recipient: UserId, clock: &impl Clock) -> Self {
        Self::new(
            recipient,
            format!("New comment on task: {}", task.title()),
            NotificationKind::CommentAdded,
            clock,
        )
    }
}

/// Direct notification required by a task update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTrigger {
    /// The task gained an assignee.
    Assigned(UserId),
    /// The task moved from one assignee to another.
    Reassigned(UserId),
    /// The task entered `COMPLETED` while assigned.
    Completed(UserId),
}

impl NotificationTrigger {
    /// Returns the user to notify.
    #[must_use]
    pub const fn recipient(self) -> UserId {
        match self {
            Self::Assigned(user) | Self::Reassigned(user) | Self::Completed(user) => user,
        }
    }

    /// Builds the notification for `task` in its updated state.
    #[must_use]
    pub fn notification(self, task: &Task, clock: &impl Clock) -> Notification {
        let (prefix, kind) = match self {
            Self::Assigned(_) => ("New task assigned", NotificationKind::TaskAssigned),
            Self::Reassigned(_) => ("Task reassigned", NotificationKind::TaskAssigned),
            Self::Completed(_) => ("Task completed", NotificationKind::TaskCompleted),
        };
        Notification::new(
            self.recipient(),
            format!("{prefix}: {}", task.title()),
            kind,
            clock,
        )
    }
}

/// Evaluates the notification triggers for an update from `old` to `new`.
///
/// Clearing the assignee triggers nothing, and re-saving a completed task
/// does not notify again.
#[must_use]
pub fn update_triggers(old: &Task, new: &Task) -> Vec<NotificationTrigger> {
    let mut triggers = Vec::new();
    match (old.assigned_to(), new.assigned_to()) {
        (None, Some(assignee)) => triggers.push(NotificationTrigger::Assigned(assignee)),
        (Some(previous), Some(assignee)) if previous != assignee => {
            triggers.push(NotificationTrigger::Reassigned(assignee));
        }
        _ => {}
    }

    let entered_completed =
        old.status() != TaskStatus::Completed && new.status() == TaskStatus::Completed;
    if let (true, Some(assignee)) = (entered_completed, new.assigned_to()) {
        triggers.push(NotificationTrigger::Completed(assignee));
    }
    triggers
}
