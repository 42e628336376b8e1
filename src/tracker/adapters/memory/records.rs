//! Table storage and record trait implementations for the in-memory store.

use std::collections::HashMap;
use std::sync::atomic::Ordering;

use super::FaultSwitches;
use crate::tracker::{
    domain::{
        Comment, CommentId, HistoryEntry, Notification, NotificationId, Project, ProjectId, Task,
        TaskId, User, UserId,
    },
    ports::{
        CommentRecords, HistoryRecords, NotificationRecords, ProjectRecords, TaskRecords,
        TrackerStoreError, TrackerStoreResult,
    },
};

#[derive(Debug, Clone, Default)]
pub(crate) struct TrackerTables {
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) projects: HashMap<ProjectId, Project>,
    pub(crate) tasks: HashMap<TaskId, Task>,
    pub(crate) comments: Vec<Comment>,
    pub(crate) history: Vec<HistoryEntry>,
    pub(crate) notifications: Vec<Notification>,
}

impl TrackerTables {
    fn remove_task_cascade(&mut self, id: TaskId) {
        self.tasks.remove(&id);
        self.comments.retain(|comment| comment.task_id != id);
        self.history.retain(|entry| entry.task_id != id);
    }

    /// Returns `true` when a notification with the same id or dedupe key exists.
    pub(crate) fn has_notification_conflict(&self, candidate: &Notification) -> bool {
        self.notifications.iter().any(|existing| {
            existing.id == candidate.id
                || (candidate.dedupe_key.is_some() && existing.dedupe_key == candidate.dedupe_key)
        })
    }
}

fn injected_failure(operation: &str) -> TrackerStoreError {
    TrackerStoreError::persistence(std::io::Error::other(format!(
        "injected failure: {operation}"
    )))
}

pub(super) struct MemoryTransaction<'a> {
    tables: &'a mut TrackerTables,
    faults: &'a FaultSwitches,
}

impl<'a> MemoryTransaction<'a> {
    pub(super) const fn new(tables: &'a mut TrackerTables, faults: &'a FaultSwitches) -> Self {
        Self { tables, faults }
    }
}

impl ProjectRecords for MemoryTransaction<'_> {
    fn find_project(&mut self, id: ProjectId) -> TrackerStoreResult<Option<Project>> {
        Ok(self.tables.projects.get(&id).cloned())
    }

    fn insert_project(&mut self, project: &Project) -> TrackerStoreResult<()> {
        if self.tables.projects.contains_key(&project.id()) {
            return Err(TrackerStoreError::duplicate("projects", project.id()));
        }
        self.tables.projects.insert(project.id(), project.clone());
        Ok(())
    }

    fn update_project(&mut self, project: &Project) -> TrackerStoreResult<()> {
        let slot = self
            .tables
            .projects
            .get_mut(&project.id())
            .ok_or_else(|| TrackerStoreError::missing("projects", project.id()))?;
        *slot = project.clone();
        Ok(())
    }

    fn delete_project(&mut self, id: ProjectId) -> TrackerStoreResult<()> {
        if self.tables.projects.remove(&id).is_none() {
            return Err(TrackerStoreError::missing("projects", id));
        }
        let owned_tasks: Vec<TaskId> = self
            .tables
            .tasks
            .values()
            .filter(|task| task.project_id() == id)
            .map(Task::id)
            .collect();
        for task_id in owned_tasks {
            self.tables.remove_task_cascade(task_id);
        }
        Ok(())
    }
}

impl TaskRecords for MemoryTransaction<'_> {
    fn find_task(&mut self, id: TaskId) -> TrackerStoreResult<Option<Task>> {
        Ok(self.tables.tasks.get(&id).cloned())
    }

    fn insert_task(&mut self, task: &Task) -> TrackerStoreResult<()> {
        if self.tables.tasks.contains_key(&task.id()) {
            return Err(TrackerStoreError::duplicate("tasks", task.id()));
        }
        if !self.tables.projects.contains_key(&task.project_id()) {
            return Err(TrackerStoreError::missing("projects", task.project_id()));
        }
        self.tables.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    fn update_task(&mut self, task: &Task) -> TrackerStoreResult<()> {
        let slot = self
            .tables
            .tasks
            .get_mut(&task.id())
            .ok_or_else(|| TrackerStoreError::missing("tasks", task.id()))?;
        *slot = task.clone();
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> TrackerStoreResult<()> {
        if !self.tables.tasks.contains_key(&id) {
            return Err(TrackerStoreError::missing("tasks", id));
        }
        self.tables.remove_task_cascade(id);
        Ok(())
    }
}

impl HistoryRecords for MemoryTransaction<'_> {
    fn insert_history(&mut self, entry: &HistoryEntry) -> TrackerStoreResult<()> {
        if self.faults.history_writes.load(Ordering::SeqCst) {
            return Err(injected_failure("insert history"));
        }
        self.tables.history.push(entry.clone());
        Ok(())
    }

    fn history_for_task(&mut self, task_id: TaskId) -> TrackerStoreResult<Vec<HistoryEntry>> {
        let mut entries: Vec<HistoryEntry> = self
            .tables
            .history
            .iter()
            .filter(|entry| entry.task_id == task_id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.timestamp);
        Ok(entries)
    }
}

impl CommentRecords for MemoryTransaction<'_> {
    fn find_comment(&mut self, id: CommentId) -> TrackerStoreResult<Option<Comment>> {
        Ok(self
            .tables
            .comments
            .iter()
            .find(|comment| comment.id == id)
            .cloned())
    }

    fn insert_comment(&mut self, comment: &Comment) -> TrackerStoreResult<()> {
        if !self.tables.tasks.contains_key(&comment.task_id) {
            return Err(TrackerStoreError::missing("tasks", comment.task_id));
        }
        self.tables.comments.push(comment.clone());
        Ok(())
    }

    fn comments_for_task(&mut self, task_id: TaskId) -> TrackerStoreResult<Vec<Comment>> {
        let mut found: Vec<Comment> = self
            .tables
            .comments
            .iter()
            .filter(|comment| comment.task_id == task_id)
            .cloned()
            .collect();
        found.sort_by_key(|comment| comment.created_at);
        Ok(found)
    }

    fn delete_comment(&mut self, id: CommentId) -> TrackerStoreResult<()> {
        let before = self.tables.comments.len();
        self.tables.comments.retain(|comment| comment.id != id);
        if self.tables.comments.len() == before {
            return Err(TrackerStoreError::missing("comments", id));
        }
        Ok(())
    }
}

impl NotificationRecords for MemoryTransaction<'_> {
    fn insert_notification(&mut self, notification: &Notification) -> TrackerStoreResult<()> {
        if self.faults.notification_writes.load(Ordering::SeqCst) {
            return Err(injected_failure("insert notification"));
        }
        if self.tables.has_notification_conflict(notification) {
            return Err(TrackerStoreError::duplicate("notifications", notification.id));
        }
        self.tables.notifications.push(notification.clone());
        Ok(())
    }

    fn find_notification(
        &mut self,
        id: NotificationId,
    ) -> TrackerStoreResult<Option<Notification>> {
        Ok(self
            .tables
            .notifications
            .iter()
            .find(|notification| notification.id == id)
            .cloned())
    }

    fn notifications_for(
        &mut self,
        user: UserId,
        unread_only: bool,
    ) -> TrackerStoreResult<Vec<Notification>> {
        let mut found: Vec<Notification> = self
            .tables
            .notifications
            .iter()
            .rev()
            .filter(|notification| notification.user_id == user)
            .filter(|notification| !unread_only || !notification.read)
            .cloned()
            .collect();
        found.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(found)
    }

    fn count_unread(&mut self, user: UserId) -> TrackerStoreResult<usize> {
        Ok(self
            .tables
            .notifications
            .iter()
            .filter(|notification| notification.user_id == user && !notification.read)
            .count())
    }

    fn mark_notification_read(&mut self, id: NotificationId) -> TrackerStoreResult<()> {
        let notification = self
            .tables
            .notifications
            .iter_mut()
            .find(|notification| notification.id == id)
            .ok_or_else(|| TrackerStoreError::missing("notifications", id))?;
        notification.read = true;
        Ok(())
    }

    fn mark_all_read(&mut self, user: UserId) -> TrackerStoreResult<usize> {
        let mut changed = 0;
        for notification in self
            .tables
            .notifications
            .iter_mut()
            .filter(|notification| notification.user_id == user && !notification.read)
        {
            notification.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    fn delete_notification(&mut self, id: NotificationId) -> TrackerStoreResult<()> {
        let before = self.tables.notifications.len();
        self.tables
            .notifications
            .retain(|notification| notification.id != id);
        if self.tables.notifications.len() == before {
            return Err(TrackerStoreError::missing("notifications", id));
        }
        Ok(())
    }
}
