//! Diesel row model for system events.

use super::schema::system_events;
use crate::audit::{
    domain::{EventDetails, SystemEvent, SystemEventId, SystemEventKind},
    ports::{AuditStoreError, AuditStoreResult},
};
use crate::tracker::domain::{ProjectId, TaskId, UserId};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

/// System event row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = system_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SystemEventRow {
    /// Event identifier.
    pub id: Uuid,
    /// Mutation type.
    pub kind: String,
    /// Acting user.
    pub user_id: Uuid,
    /// Acting user's display name.
    pub user_name: Option<String>,
    /// Affected project.
    pub project_id: Option<Uuid>,
    /// Affected task.
    pub task_id: Option<Uuid>,
    /// Human readable description.
    pub action: String,
    /// Free-form payload.
    pub details: Value,
    /// Whether admins have been notified.
    pub processed: bool,
    /// When the event was marked processed.
    pub processed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&SystemEvent> for SystemEventRow {
    fn from(event: &SystemEvent) -> Self {
        Self {
            id: event.id.into_inner(),
            kind: event.kind.as_str().to_owned(),
            user_id: event.user_id.into_inner(),
            user_name: event.user_name.clone(),
            project_id: event.project_id.map(ProjectId::into_inner),
            task_id: event.task_id.map(TaskId::into_inner),
            action: event.action.clone(),
            details: event.details.to_value(),
            processed: event.processed,
            processed_at: event.processed_at,
            created_at: event.created_at,
        }
    }
}

impl SystemEventRow {
    /// Maps the row to a domain event.
    pub fn into_event(self) -> AuditStoreResult<SystemEvent> {
        Ok(SystemEvent {
            id: SystemEventId::from_uuid(self.id),
            kind: SystemEventKind::try_from(self.kind.as_str())
                .map_err(AuditStoreError::persistence)?,
            user_id: UserId::from_uuid(self.user_id),
            user_name: self.user_name,
            project_id: self.project_id.map(ProjectId::from_uuid),
            task_id: self.task_id.map(TaskId::from_uuid),
            action: self.action,
            details: EventDetails::from_value(self.details),
            processed: self.processed,
            processed_at: self.processed_at,
            created_at: self.created_at,
        })
    }
}
