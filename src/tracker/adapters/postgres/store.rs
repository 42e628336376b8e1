//! `PostgreSQL` tracker store running each unit of work in a diesel
//! transaction on a blocking thread.

use super::records::PgTrackerTransaction;
use crate::tracker::ports::{TrackerStore, TrackerStoreError, TrackerTransaction};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type used by the tracker and audit adapters.
pub type TrackerPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed tracker store.
#[derive(Debug, Clone)]
pub struct PostgresTrackerStore {
    pool: TrackerPgPool,
}

impl PostgresTrackerStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TrackerPgPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a diesel transaction: either the unit of work rejected it
/// or the database did.
enum TxFailure<E> {
    Work(E),
    Database(diesel::result::Error),
}

impl<E> From<diesel::result::Error> for TxFailure<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err)
    }
}

#[async_trait]
impl TrackerStore for PostgresTrackerStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TrackerTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TrackerStoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut pooled = pool
                .get()
                .map_err(|err| E::from(TrackerStoreError::persistence(err)))?;
            let connection: &mut PgConnection = &mut pooled;
            connection
                .transaction::<T, TxFailure<E>, _>(|conn| {
                    let mut records = PgTrackerTransaction { conn };
                    work(&mut records).map_err(TxFailure::Work)
                })
                .map_err(|failure| match failure {
                    TxFailure::Work(err) => err,
                    TxFailure::Database(err) => E::from(TrackerStoreError::persistence(err)),
                })
        })
        .await
        .map_err(|err| E::from(TrackerStoreError::persistence(err)))?
    }
}
