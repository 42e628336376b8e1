//! Domain model for projects, tasks and their side records.
//!
//! Tasks are mutated only by their creator. Every mutation produces field
//! level [`HistoryEntry`] rows and direct [`Notification`] rows that are
//! written in the same unit of work as the task itself.

mod comment;
mod error;
pub mod history;
mod ids;
pub mod notification;
mod project;
mod task;
mod user;

pub use comment::{COMMENT_TEXT_MAX, Comment};
pub use error::{ParseTrackerValueError, TrackerDomainError};
pub use history::{FieldChange, HistoryAction, HistoryEntry, TrackedField, tracked_changes};
pub use ids::{CommentId, HistoryId, NotificationId, ProjectId, TaskId, UserId};
pub use notification::{Notification, NotificationKind, NotificationTrigger, update_triggers};
pub use project::{PROJECT_DESCRIPTION_MAX, PROJECT_NAME_MAX, Project};
pub use task::{
    PersistedTaskData, TASK_DESCRIPTION_MAX, TASK_TITLE_MAX, Task, TaskFields, TaskPriority,
    TaskStatus,
};
pub use user::{Actor, Role, User};
