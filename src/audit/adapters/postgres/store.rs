//! `PostgreSQL` event store and admin inbox.

use super::{models::SystemEventRow, schema::system_events};
use crate::audit::{
    domain::{SystemEvent, SystemEventId},
    ports::{AdminInbox, AuditStoreError, AuditStoreResult, SystemEventStore},
};
use crate::tracker::{
    adapters::postgres::{
        TrackerPgPool,
        models::{NotificationRow, UserRow},
        schema::{notifications, users},
    },
    domain::{Notification, Role, User},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed event store and admin inbox.
#[derive(Debug, Clone)]
pub struct PostgresAuditStore {
    pool: TrackerPgPool,
}

impl PostgresAuditStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TrackerPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> AuditStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AuditStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(AuditStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(AuditStoreError::persistence)?
    }
}

#[async_trait]
impl SystemEventStore for PostgresAuditStore {
    async fn append(&self, event: &SystemEvent) -> AuditStoreResult<()> {
        let event_id = event.id;
        let row = SystemEventRow::from(event);
        self.run_blocking(move |connection| {
            diesel::insert_into(system_events::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        AuditStoreError::Duplicate(event_id)
                    }
                    _ => AuditStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: SystemEventId) -> AuditStoreResult<Option<SystemEvent>> {
        self.run_blocking(move |connection| {
            let row = system_events::table
                .find(id.into_inner())
                .select(SystemEventRow::as_select())
                .first::<SystemEventRow>(connection)
                .optional()
                .map_err(AuditStoreError::persistence)?;
            row.map(SystemEventRow::into_event).transpose()
        })
        .await
    }

    async fn fetch_unprocessed(&self, limit: usize) -> AuditStoreResult<Vec<SystemEvent>> {
        let limit = i64::try_from(limit).map_err(AuditStoreError::persistence)?;
        self.run_blocking(move |connection| {
            system_events::table
                .filter(system_events::processed.eq(false))
                .order(system_events::created_at.asc())
                .limit(limit)
                .select(SystemEventRow::as_select())
                .load::<SystemEventRow>(connection)
                .map_err(AuditStoreError::persistence)?
                .into_iter()
                .map(SystemEventRow::into_event)
                .collect()
        })
        .await
    }

    async fn mark_processed(
        &self,
        ids: &[SystemEventId],
        at: DateTime<Utc>,
    ) -> AuditStoreResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            diesel::update(
                system_events::table
                    .filter(system_events::id.eq_any(uuids))
                    .filter(system_events::processed.eq(false)),
            )
            .set((
                system_events::processed.eq(true),
                system_events::processed_at.eq(Some(at)),
            ))
            .execute(connection)
            .map_err(AuditStoreError::persistence)
        })
        .await
    }
}

#[async_trait]
impl AdminInbox for PostgresAuditStore {
    async fn list_admins(&self) -> AuditStoreResult<Vec<User>> {
        self.run_blocking(|connection| {
            users::table
                .filter(users::role.eq(Role::Admin.as_str()))
                .order(users::id.asc())
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(AuditStoreError::persistence)?
                .into_iter()
                .map(|row| row.into_user().map_err(AuditStoreError::persistence))
                .collect()
        })
        .await
    }

    async fn deliver(&self, notifications: &[Notification]) -> AuditStoreResult<usize> {
        if notifications.is_empty() {
            return Ok(0);
        }
        let rows: Vec<NotificationRow> = notifications.iter().map(NotificationRow::from).collect();
        self.run_blocking(move |connection| {
            diesel::insert_into(notifications::table)
                .values(&rows)
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(AuditStoreError::persistence)
        })
        .await
    }
}
