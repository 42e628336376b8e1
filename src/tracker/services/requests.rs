//! Request payloads accepted by the tracker service.

use crate::tracker::domain::{
    ProjectId, Task, TaskFields, TaskId, TaskPriority, TaskStatus, TrackerDomainError, UserId,
};
use chrono::{DateTime, Utc};

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
}

impl CreateProjectRequest {
    /// Creates a request with the required project name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Sets the project description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Request payload for renaming a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProjectRequest {
    pub(crate) project_id: ProjectId,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
}

impl UpdateProjectRequest {
    /// Creates a request replacing the project name and clearing the
    /// description.
    #[must_use]
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            project_id,
            name: name.into(),
            description: None,
        }
    }

    /// Sets the new project description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Full set of caller-editable task fields.
///
/// Used as-is for creation and as a complete replacement for updates:
/// leaving the assignee, due date or description unset clears them.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    project_id: ProjectId,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    assigned_to: Option<UserId>,
    due_date: Option<DateTime<Utc>>,
    estimated_hours: f64,
}

impl TaskDraft {
    /// Creates a pending, medium-priority draft in `project_id`.
    #[must_use]
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            assigned_to: None,
            due_date: None,
            estimated_hours: 0.0,
        }
    }

    /// Starts a draft from the current state of `task`.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            project_id: task.project_id(),
            title: task.title().to_owned(),
            description: task.description().map(ToOwned::to_owned),
            status: task.status(),
            priority: task.priority(),
            assigned_to: task.assigned_to(),
            due_date: task.due_date(),
            estimated_hours: task.estimated_hours(),
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets or clears the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: Option<UserId>) -> Self {
        self.assigned_to = assignee;
        self
    }

    /// Sets or clears the due date.
    #[must_use]
    pub fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Sets the estimated effort in hours.
    #[must_use]
    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    /// Returns the target project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub(crate) fn into_fields(self) -> Result<TaskFields, TrackerDomainError> {
        TaskFields {
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            project_id: self.project_id,
            assigned_to: self.assigned_to,
            due_date: self.due_date,
            estimated_hours: self.estimated_hours,
        }
        .validate()
    }
}

/// Request payload for updating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTaskRequest {
    pub(crate) task_id: TaskId,
    pub(crate) draft: TaskDraft,
    pub(crate) actual_hours: Option<f64>,
}

impl UpdateTaskRequest {
    /// Creates a request replacing the fields of `task_id` with `draft`.
    #[must_use]
    pub fn new(task_id: TaskId, draft: TaskDraft) -> Self {
        Self {
            task_id,
            draft,
            actual_hours: None,
        }
    }

    /// Records the actual effort; unset keeps the stored value.
    #[must_use]
    pub fn with_actual_hours(mut self, hours: f64) -> Self {
        self.actual_hours = Some(hours);
        self
    }
}

/// Request payload for commenting on a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCommentRequest {
    pub(crate) task_id: TaskId,
    pub(crate) text: String,
}

impl AddCommentRequest {
    /// Creates a comment request.
    #[must_use]
    pub fn new(task_id: TaskId, text: impl Into<String>) -> Self {
        Self {
            task_id,
            text: text.into(),
        }
    }
}
