//! Service-level errors for tracker operations.

use crate::tracker::{
    domain::{CommentId, NotificationId, ProjectId, TaskId, TrackerDomainError},
    ports::TrackerStoreError,
};
use std::fmt;
use thiserror::Error;

/// Record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// A project.
    Project(ProjectId),
    /// A task.
    Task(TaskId),
    /// A comment.
    Comment(CommentId),
    /// A notification.
    Notification(NotificationId),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project(id) => write!(f, "project {id}"),
            Self::Task(id) => write!(f, "task {id}"),
            Self::Comment(id) => write!(f, "comment {id}"),
            Self::Notification(id) => write!(f, "notification {id}"),
        }
    }
}

/// Errors surfaced to the caller of a tracker operation.
#[derive(Debug, Error)]
pub enum TrackerServiceError {
    /// The addressed record does not exist.
    #[error("{0} not found")]
    NotFound(Resource),

    /// The caller does not own the addressed record.
    #[error("{0}")]
    Forbidden(&'static str),

    /// Input validation failed.
    #[error(transparent)]
    Invalid(#[from] TrackerDomainError),

    /// The store failed; the unit of work was rolled back.
    #[error(transparent)]
    Store(#[from] TrackerStoreError),
}

impl TrackerServiceError {
    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Invalid(_) => "BAD_REQUEST",
            Self::Store(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// Result type for tracker service operations.
pub type TrackerServiceResult<T> = Result<T, TrackerServiceError>;
