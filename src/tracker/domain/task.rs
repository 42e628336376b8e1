//! Task aggregate root and its status and priority enumerations.

use super::{ParseTrackerValueError, ProjectId, TaskId, TrackerDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Maximum task title length in characters.
pub const TASK_TITLE_MAX: usize = 500;
/// Maximum task description length in characters.
pub const TASK_DESCRIPTION_MAX: usize = 2000;

/// Task workflow status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Work has not started.
    #[default]
    Pending,
    /// Work is under way.
    InProgress,
    /// Work is finished.
    Completed,
    /// Work was abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTrackerValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(ParseTrackerValueError::new("task status", value)),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    /// Low priority.
    Low,
    /// Medium priority.
    #[default]
    Medium,
    /// High priority.
    High,
    /// Critical priority.
    Critical,
}

impl TaskPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTrackerValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(ParseTrackerValueError::new("task priority", value)),
        }
    }
}

/// Validated, caller-editable task fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    /// Task title.
    pub title: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Workflow status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: TaskPriority,
    /// Owning project.
    pub project_id: ProjectId,
    /// Optional assignee.
    pub assigned_to: Option<UserId>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Estimated effort in hours.
    pub estimated_hours: f64,
}

impl TaskFields {
    /// Validates the raw field values.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError`] when the title is empty, a text field
    /// is too long or the estimate is not a non-negative number.
    pub fn validate(self) -> Result<Self, TrackerDomainError> {
        Ok(Self {
            title: TrackerDomainError::require_text("task title", &self.title, TASK_TITLE_MAX)?,
            description: TrackerDomainError::optional_text(
                "task description",
                self.description,
                TASK_DESCRIPTION_MAX,
            )?,
            estimated_hours: TrackerDomainError::check_hours(
                "estimated hours",
                self.estimated_hours,
            )?,
            ..self
        })
    }
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted editable fields.
    pub fields: TaskFields,
    /// Persisted creator.
    pub created_by: UserId,
    /// Persisted actual effort.
    pub actual_hours: f64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    project_id: ProjectId,
    assigned_to: Option<UserId>,
    created_by: UserId,
    due_date: Option<DateTime<Utc>>,
    estimated_hours: f64,
    actual_hours: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task owned by `creator` from validated fields.
    #[must_use]
    pub fn create(fields: TaskFields, creator: UserId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title: fields.title,
            description: fields.description,
            status: fields.status,
            priority: fields.priority,
            project_id: fields.project_id,
            assigned_to: fields.assigned_to,
            created_by: creator,
            due_date: fields.due_date,
            estimated_hours: fields.estimated_hours,
            actual_hours: 0.0,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        let PersistedTaskData {
            id,
            fields,
            created_by,
            actual_hours,
            created_at,
            updated_at,
        } = data;
        Self {
            id,
            title: fields.title,
            description: fields.description,
            status: fields.status,
            priority: fields.priority,
            project_id: fields.project_id,
            assigned_to: fields.assigned_to,
            created_by,
            due_date: fields.due_date,
            estimated_hours: fields.estimated_hours,
            actual_hours,
            created_at,
            updated_at,
        }
    }

    /// Replaces every editable field.
    ///
    /// `actual_hours` of `None` keeps the recorded value.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::InvalidHours`] for an invalid actual
    /// effort; the task is left unchanged.
    pub fn apply(
        &mut self,
        fields: TaskFields,
        actual_hours: Option<f64>,
        clock: &impl Clock,
    ) -> Result<(), TrackerDomainError> {
        if let Some(hours) = actual_hours {
            self.actual_hours = TrackerDomainError::check_hours("actual hours", hours)?;
        }
        self.title = fields.title;
        self.description = fields.description;
        self.status = fields.status;
        self.priority = fields.priority;
        self.project_id = fields.project_id;
        self.assigned_to = fields.assigned_to;
        self.due_date = fields.due_date;
        self.estimated_hours = fields.estimated_hours;
        self.updated_at = clock.utc();
        Ok(())
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<UserId> {
        self.assigned_to
    }

    /// Returns the creator, who is also the only user allowed to mutate it.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the estimated effort in hours.
    #[must_use]
    pub const fn estimated_hours(&self) -> f64 {
        self.estimated_hours
    }

    /// Returns the recorded effort in hours.
    #[must_use]
    pub const fn actual_hours(&self) -> f64 {
        self.actual_hours
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when `user` created this task.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.created_by == user
    }
}
