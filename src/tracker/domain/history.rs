//! Append-only, field-level task history.

use super::{HistoryId, ParseTrackerValueError, Task, TaskId, UserId};
use chrono::{DateTime, SecondsFormat, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Kind of change recorded by a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryAction {
    /// The task was created.
    Created,
    /// The status changed.
    StatusChanged,
    /// The title changed.
    TitleChanged,
    /// The priority changed.
    PriorityChanged,
    /// The assignee changed (including clearing it).
    Assigned,
    /// The due date changed.
    DueDateChanged,
    /// The task was deleted.
    Deleted,
}

impl HistoryAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::StatusChanged => "STATUS_CHANGED",
            Self::TitleChanged => "TITLE_CHANGED",
            Self::PriorityChanged => "PRIORITY_CHANGED",
            Self::Assigned => "ASSIGNED",
            Self::DueDateChanged => "DUE_DATE_CHANGED",
            Self::Deleted => "DELETED",
        }
    }
}

impl TryFrom<&str> for HistoryAction {
    type Error = ParseTrackerValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CREATED" => Ok(Self::Created),
            "STATUS_CHANGED" => Ok(Self::StatusChanged),
            "TITLE_CHANGED" => Ok(Self::TitleChanged),
            "PRIORITY_CHANGED" => Ok(Self::PriorityChanged),
            "ASSIGNED" => Ok(Self::Assigned),
            "DUE_DATE_CHANGED" => Ok(Self::DueDateChanged),
            "DELETED" => Ok(Self::Deleted),
            _ => Err(ParseTrackerValueError::new("history action", value)),
        }
    }
}

/// Immutable history record attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Entry identifier.
    pub id: HistoryId,
    /// Task the change applies to.
    pub task_id: TaskId,
    /// User who made the change.
    pub user_id: UserId,
    /// Kind of change.
    pub action: HistoryAction,
    /// Stringified value before the change; empty when absent.
    pub old_value: String,
    /// Stringified value after the change; empty when absent.
    pub new_value: String,
    /// Time of the change.
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Records a change made by `actor` to `task_id`.
    #[must_use]
    pub fn record(
        task_id: TaskId,
        actor: UserId,
        action: HistoryAction,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: HistoryId::new(),
            task_id,
            user_id: actor,
            action,
            old_value: old_value.into(),
            new_value: new_value.into(),
            timestamp: clock.utc(),
        }
    }

    /// Entry written when a task is created.
    #[must_use]
    pub fn created(task: &Task, actor: UserId, clock: &impl Clock) -> Self {
        Self::record(task.id(), actor, HistoryAction::Created, "", task.title(), clock)
    }

    /// Entry written just before a task is deleted.
    #[must_use]
    pub fn deleted(task: &Task, actor: UserId, clock: &impl Clock) -> Self {
        Self::record(task.id(), actor, HistoryAction::Deleted, task.title(), "", clock)
    }
}

/// Task field whose changes are audited.
///
/// Description and hour estimates are deliberately not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedField {
    /// Workflow status.
    Status,
    /// Title.
    Title,
    /// Priority.
    Priority,
    /// Assignee identifier.
    Assignee,
    /// Due date.
    DueDate,
}

impl TrackedField {
    /// Tracked fields in the order their entries are written.
    pub const ALL: [Self; 5] = [
        Self::Status,
        Self::Title,
        Self::Priority,
        Self::Assignee,
        Self::DueDate,
    ];

    /// Returns the history action recorded for a change to this field.
    #[must_use]
    pub const fn history_action(self) -> HistoryAction {
        match self {
            Self::Status => HistoryAction::StatusChanged,
            Self::Title => HistoryAction::TitleChanged,
            Self::Priority => HistoryAction::PriorityChanged,
            Self::Assignee => HistoryAction::Assigned,
            Self::DueDate => HistoryAction::DueDateChanged,
        }
    }

    /// Returns the normalized string value of this field on `task`.
    ///
    /// Absent values normalize to the empty string and due dates to RFC 3339
    /// with millisecond precision.
    #[must_use]
    pub fn normalized_value(self, task: &Task) -> String {
        match self {
            Self::Status => task.status().as_str().to_owned(),
            Self::Title => task.title().to_owned(),
            Self::Priority => task.priority().as_str().to_owned(),
            Self::Assignee => task
                .assigned_to()
                .map(|user| user.to_string())
                .unwrap_or_default(),
            Self::DueDate => task.due_date().map(format_due_date).unwrap_or_default(),
        }
    }
}

/// Normalized change of one tracked field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Changed field.
    pub field: TrackedField,
    /// Normalized value before the update.
    pub old_value: String,
    /// Normalized value after the update.
    pub new_value: String,
}

impl FieldChange {
    /// Converts the change into a history entry.
    #[must_use]
    pub fn into_entry(self, task_id: TaskId, actor: UserId, clock: &impl Clock) -> HistoryEntry {
        HistoryEntry::record(
            task_id,
            actor,
            self.field.history_action(),
            self.old_value,
            self.new_value,
            clock,
        )
    }
}

/// Compares the five tracked fields of `old` and `new`.
///
/// Returns one change per field whose normalized values differ.
#[must_use]
pub fn tracked_changes(old: &Task, new: &Task) -> Vec<FieldChange> {
    TrackedField::ALL
        .into_iter()
        .filter_map(|field| {
            let old_value = field.normalized_value(old);
            let new_value = field.normalized_value(new);
            (old_value != new_value).then_some(FieldChange {
                field,
                old_value,
                new_value,
            })
        })
        .collect()
}

fn format_due_date(due: DateTime<Utc>) -> String {
    due.to_rfc3339_opts(SecondsFormat::Millis, true)
}
