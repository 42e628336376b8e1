//! Record trait implementations over a connection inside an open
//! transaction.

use super::{
    models::{CommentRow, HistoryRow, NotificationRow, ProjectRow, TaskRow},
    schema::{comments, notifications, projects, task_history, tasks},
};
use crate::tracker::{
    domain::{
        Comment, CommentId, HistoryEntry, Notification, NotificationId, Project, ProjectId, Task,
        TaskId, UserId,
    },
    ports::{
        CommentRecords, HistoryRecords, NotificationRecords, ProjectRecords, TaskRecords,
        TrackerStoreError, TrackerStoreResult,
    },
};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Connection borrowed for the lifetime of one transaction.
pub(super) struct PgTrackerTransaction<'c> {
    pub(super) conn: &'c mut PgConnection,
}

fn insert_error(
    table: &'static str,
    id: impl ToString,
) -> impl FnOnce(DieselError) -> TrackerStoreError {
    move |err| match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            TrackerStoreError::duplicate(table, id)
        }
        _ => TrackerStoreError::persistence(err),
    }
}

fn expect_one(affected: usize, table: &'static str, id: impl ToString) -> TrackerStoreResult<()> {
    if affected == 0 {
        return Err(TrackerStoreError::missing(table, id));
    }
    Ok(())
}

impl ProjectRecords for PgTrackerTransaction<'_> {
    fn find_project(&mut self, id: ProjectId) -> TrackerStoreResult<Option<Project>> {
        let row = projects::table
            .find(id.into_inner())
            .select(ProjectRow::as_select())
            .first::<ProjectRow>(&mut *self.conn)
            .optional()
            .map_err(TrackerStoreError::persistence)?;
        Ok(row.map(Project::from))
    }

    fn insert_project(&mut self, project: &Project) -> TrackerStoreResult<()> {
        diesel::insert_into(projects::table)
            .values(ProjectRow::from(project))
            .execute(&mut *self.conn)
            .map_err(insert_error("projects", project.id()))?;
        Ok(())
    }

    fn update_project(&mut self, project: &Project) -> TrackerStoreResult<()> {
        let affected = diesel::update(projects::table.find(project.id().into_inner()))
            .set(ProjectRow::from(project))
            .execute(&mut *self.conn)
            .map_err(TrackerStoreError::persistence)?;
        expect_one(affected, "projects", project.id())
    }

    fn delete_project(&mut self, id: ProjectId) -> TrackerStoreResult<()> {
        let affected = diesel::delete(projects::table.find(id.into_inner()))
            .execute(&mut *self.conn)
            .map_err(TrackerStoreError::persistence)?;
        expect_one(affected, "projects", id)
    }
}

impl TaskRecords for PgTrackerTransaction<'_> {
    fn find_task(&mut self, id: TaskId) -> TrackerStoreResult<Option<Task>> {
        let row = tasks::table
            .find(id.into_inner())
            .select(TaskRow::as_select())
            .first::<TaskRow>(&mut *self.conn)
            .optional()
            .map_err(TrackerStoreError::persistence)?;
        row.map(TaskRow::into_task).transpose()
    }

    fn insert_task(&mut self, task: &Task) -> TrackerStoreResult<()> {
        diesel::insert_into(tasks::table)
            .values(TaskRow::from(task))
            .execute(&mut *self.conn)
            .map_err(insert_error("tasks", task.id()))?;
        Ok(())
    }

    fn update_task(&mut self, task: &Task) -> TrackerStoreResult<()> {
        let affected = diesel::update(tasks::table.find(task.id().into_inner()))
            .set(TaskRow::from(task))
            .execute(&mut *self.conn)
            .map_err(TrackerStoreError::persistence)?;
        expect_one(affected, "tasks", task.id())
    }

    fn delete_task(&mut self, id: TaskId) -> TrackerStoreResult<()> {
        let affected = diesel::delete(tasks::table.find(id.into_inner()))
            .execute(&mut *self.conn)
            .map_err(TrackerStoreError::persistence)?;
        expect_one(affected, "tasks", id)
    }
}

impl HistoryRecords for PgTrackerTransaction<'_> {
    fn insert_history(&mut self, entry: &HistoryEntry) -> TrackerStoreResult<()> {
        diesel::insert_into(task_history::table)
            .values(HistoryRow::from(entry))
            .execute(&mut *self.conn)
            .map_err(insert_error("task_history", entry.id))?;
        Ok(())
    }

    fn history_for_task(&mut self, task_id: TaskId) -> TrackerStoreResult<Vec<HistoryEntry>> {
        task_history::table
            .filter(task_history::task_id.eq(task_id.into_inner()))
            .order((task_history::timestamp.asc(), task_history::seq.asc()))
            .select(HistoryRow::as_select())
            .load::<HistoryRow>(&mut *self.conn)
            .map_err(TrackerStoreError::persistence)?
            .into_iter()
            .map(HistoryRow::into_entry)
            .collect()
    }
}

impl CommentRecords for PgTrackerTransaction<'_> {
    fn find_comment(&mut self, id: CommentId) -> TrackerStoreResult<Option<Comment>> {
        let row = comments::table
            .find(id.into_inner())
            .select(CommentRow::as_select())
            .first::<CommentRow>(&mut *self.conn)
            .optional()
            .map_err(TrackerStoreError::persistence)?;
        Ok(row.map(Comment::from))
    }

    fn insert_comment(&mut self, comment: &Comment) -> TrackerStoreResult<()> {
        diesel::insert_into(comments::table)
            .values(CommentRow::from(comment))
            .execute(&mut *self.conn)
            .map_err(insert_error("comments", comment.id))?;
        Ok(())
    }

    fn comments_for_task(&mut self, task_id: TaskId) -> TrackerStoreResult<Vec<Comment>> {
        let rows = comments::table
            .filter(comments::task_id.eq(task_id.into_inner()))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select(CommentRow::as_select())
            .load::<CommentRow>(&mut *self.conn)
            .map_err(TrackerStoreError::persistence)?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    fn delete_comment(&mut self, id: CommentId) -> TrackerStoreResult<()> {
        let affected = diesel::delete(comments::table.find(id.into_inner()))
            .execute(&mut *self.conn)
            .map_err(TrackerStoreError::persistence)?;
        expect_one(affected, "comments", id)
    }
}

impl NotificationRecords for PgTrackerTransaction<'_> {
    fn insert_notification(&mut self, notification: &Notification) -> TrackerStoreResult<()> {
        diesel::insert_into(notifications::table)
            .values(NotificationRow::from(notification))
            .execute(&mut *self.conn)
            .map_err(insert_error("notifications", notification.id))?;
        Ok(())
    }

    fn find_notification(
        &mut self,
        id: NotificationId,
    ) -> TrackerStoreResult<Option<Notification>> {
        let row = notifications::table
            .find(id.into_inner())
            .select(NotificationRow::as_select())
            .first::<NotificationRow>(&mut *self.conn)
            .optional()
            .map_err(TrackerStoreError::persistence)?;
        row.map(NotificationRow::into_notification).transpose()
    }

    fn notifications_for(
        &mut self,
        user: UserId,
        unread_only: bool,
    ) -> TrackerStoreResult<Vec<Notification>> {
        let mut query = notifications::table
            .filter(notifications::user_id.eq(user.into_inner()))
            .select(NotificationRow::as_select())
            .into_boxed();
        if unread_only {
            query = query.filter(notifications::read.eq(false));
        }
        query
            .order(notifications::created_at.desc())
            .load::<NotificationRow>(&mut *self.conn)
            .map_err(TrackerStoreError::persistence)?
            .into_iter()
            .map(NotificationRow::into_notification)
            .collect()
    }

    fn count_unread(&mut self, user: UserId) -> TrackerStoreResult<usize> {
        let count = notifications::table
            .filter(notifications::user_id.eq(user.into_inner()))
            .filter(notifications::read.eq(false))
            .count()
            .get_result::<i64>(&mut *self.conn)
            .map_err(TrackerStoreError::persistence)?;
        usize::try_from(count).map_err(TrackerStoreError::persistence)
    }

    fn mark_notification_read(&mut self, id: NotificationId) -> TrackerStoreResult<()> {
        let affected = diesel::update(notifications::table.find(id.into_inner()))
            .set(notifications::read.eq(true))
            .execute(&mut *self.conn)
            .map_err(TrackerStoreError::persistence)?;
        expect_one(affected, "notifications", id)
    }

    fn mark_all_read(&mut self, user: UserId) -> TrackerStoreResult<usize> {
        diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user.into_inner()))
                .filter(notifications::read.eq(false)),
        )
        .set(notifications::read.eq(true))
        .execute(&mut *self.conn)
        .map_err(TrackerStoreError::persistence)
    }

    fn delete_notification(&mut self, id: NotificationId) -> TrackerStoreResult<()> {
        let affected = diesel::delete(notifications::table.find(id.into_inner()))
            .execute(&mut *self.conn)
            .map_err(TrackerStoreError::persistence)?;
        expect_one(affected, "notifications", id)
    }
}
