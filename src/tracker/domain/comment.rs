//! Task comments.

use super::{CommentId, TaskId, TrackerDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Maximum comment length in characters.
pub const COMMENT_TEXT_MAX: usize = 5000;

/// Comment posted on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier.
    pub id: CommentId,
    /// Commented task.
    pub task_id: TaskId,
    /// Author.
    pub user_id: UserId,
    /// Comment body.
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a validated comment.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError`] when the text is empty or too long.
    pub fn new(
        task_id: TaskId,
        author: UserId,
        text: &str,
        clock: &impl Clock,
    ) -> Result<Self, TrackerDomainError> {
        Ok(Self {
            id: CommentId::new(),
            task_id,
            user_id: author,
            text: TrackerDomainError::require_text("comment text", text, COMMENT_TEXT_MAX)?,
            created_at: clock.utc(),
        })
    }

    /// Returns at most the first 100 characters, for audit payloads.
    #[must_use]
    pub fn excerpt(&self) -> String {
        self.text.chars().take(100).collect()
    }
}
