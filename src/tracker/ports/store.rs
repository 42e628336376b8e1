//! Transaction-scoped persistence port for tracker mutations.
//!
//! A unit of work receives a `&mut dyn TrackerTransaction`. Helpers that only
//! need part of it declare the narrower record traits instead, so each
//! mutation step can reach exactly the tables it writes.

use crate::tracker::domain::{
    Comment, CommentId, HistoryEntry, Notification, NotificationId, Project, ProjectId, Task,
    TaskId, UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for tracker store operations.
pub type TrackerStoreResult<T> = Result<T, TrackerStoreError>;

/// Errors returned by tracker store implementations.
#[derive(Debug, Clone, Error)]
pub enum TrackerStoreError {
    /// A row with the same identifier already exists.
    #[error("duplicate {table} row: {id}")]
    Duplicate {
        /// Table name.
        table: &'static str,
        /// Conflicting identifier.
        id: String,
    },

    /// A row expected to exist was not found.
    #[error("{table} row not found: {id}")]
    Missing {
        /// Table name.
        table: &'static str,
        /// Missing identifier.
        id: String,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TrackerStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Error for a row that must exist but does not.
    pub fn missing(table: &'static str, id: impl ToString) -> Self {
        Self::Missing {
            table,
            id: id.to_string(),
        }
    }

    /// Error for a primary key collision.
    pub fn duplicate(table: &'static str, id: impl ToString) -> Self {
        Self::Duplicate {
            table,
            id: id.to_string(),
        }
    }
}

/// Project rows.
pub trait ProjectRecords {
    /// Finds a project by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError`] when the lookup fails.
    fn find_project(&mut self, id: ProjectId) -> TrackerStoreResult<Option<Project>>;

    /// Inserts a new project.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Duplicate`] when the identifier exists.
    fn insert_project(&mut self, project: &Project) -> TrackerStoreResult<()>;

    /// Replaces an existing project.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Missing`] when the project does not exist.
    fn update_project(&mut self, project: &Project) -> TrackerStoreResult<()>;

    /// Deletes a project together with its tasks, their comments and history.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Missing`] when the project does not exist.
    fn delete_project(&mut self, id: ProjectId) -> TrackerStoreResult<()>;
}

/// Task rows.
pub trait TaskRecords {
    /// Finds a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError`] when the lookup fails.
    fn find_task(&mut self, id: TaskId) -> TrackerStoreResult<Option<Task>>;

    /// Inserts a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Duplicate`] when the identifier exists.
    fn insert_task(&mut self, task: &Task) -> TrackerStoreResult<()>;

    /// Replaces an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Missing`] when the task does not exist.
    fn update_task(&mut self, task: &Task) -> TrackerStoreResult<()>;

    /// Deletes a task together with its comments and history.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Missing`] when the task does not exist.
    fn delete_task(&mut self, id: TaskId) -> TrackerStoreResult<()>;
}

/// History rows.
pub trait HistoryRecords {
    /// Appends a history entry.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError`] when the insert fails.
    fn insert_history(&mut self, entry: &HistoryEntry) -> TrackerStoreResult<()>;

    /// Lists the history of a task in ascending timestamp order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError`] when the query fails.
    fn history_for_task(&mut self, task_id: TaskId) -> TrackerStoreResult<Vec<HistoryEntry>>;
}

/// Comment rows.
pub trait CommentRecords {
    /// Finds a comment by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError`] when the lookup fails.
    fn find_comment(&mut self, id: CommentId) -> TrackerStoreResult<Option<Comment>>;

    /// Inserts a new comment.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError`] when the insert fails.
    fn insert_comment(&mut self, comment: &Comment) -> TrackerStoreResult<()>;

    /// Lists the comments on a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError`] when the query fails.
    fn comments_for_task(&mut self, task_id: TaskId) -> TrackerStoreResult<Vec<Comment>>;

    /// Deletes a comment.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Missing`] when the comment does not exist.
    fn delete_comment(&mut self, id: CommentId) -> TrackerStoreResult<()>;
}

/// Notification rows.
pub trait NotificationRecords {
    /// Inserts a notification.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError`] when the insert fails.
    fn insert_notification(&mut self, notification: &Notification) -> TrackerStoreResult<()>;

    /// Finds a notification by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError`] when the lookup fails.
    fn find_notification(
        &mut self,
        id: NotificationId,
    ) -> TrackerStoreResult<Option<Notification>>;

    /// Lists notifications for `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError`] when the query fails.
    fn notifications_for(
        &mut self,
        user: UserId,
        unread_only: bool,
    ) -> TrackerStoreResult<Vec<Notification>>;

    /// Counts the unread notifications of `user`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError`] when the query fails.
    fn count_unread(&mut self, user: UserId) -> TrackerStoreResult<usize>;

    /// Sets the read flag on one notification.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Missing`] when it does not exist.
    fn mark_notification_read(&mut self, id: NotificationId) -> TrackerStoreResult<()>;

    /// Marks every unread notification of `user` as read and returns the
    /// number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError`] when the update fails.
    fn mark_all_read(&mut self, user: UserId) -> TrackerStoreResult<usize>;

    /// Deletes a notification.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerStoreError::Missing`] when it does not exist.
    fn delete_notification(&mut self, id: NotificationId) -> TrackerStoreResult<()>;
}

/// Every record trait available inside one transaction.
pub trait TrackerTransaction:
    ProjectRecords + TaskRecords + HistoryRecords + CommentRecords + NotificationRecords
{
}

impl<T> TrackerTransaction for T where
    T: ProjectRecords + TaskRecords + HistoryRecords + CommentRecords + NotificationRecords
{
}

/// Transactional tracker persistence.
#[async_trait]
pub trait TrackerStore: Send + Sync {
    /// Runs `work` inside one atomic transaction.
    ///
    /// Changes are committed only when `work` returns `Ok`; any error rolls
    /// back every write made through the transaction.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a store error converted into
    /// `E` when the transaction cannot be opened or committed.
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TrackerTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TrackerStoreError> + Send + 'static;
}
