//! Shared test helpers for `PostgreSQL` integration tests.
//!
//! Each test gets a private database cloned from a migrated template on the
//! embedded cluster. Setting `ATELIER_TEST_DATABASE_URL` points the tests at
//! an existing server instead, where each test migrates a private schema.

use super::cluster::{BoxError, ManagedCluster, shared_cluster};
use atelier::tracker::{
    adapters::postgres::TrackerPgPool,
    domain::{Actor, Role, User},
};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_types::{Nullable, Text, Uuid as SqlUuid};
use rstest::fixture;
use uuid::Uuid;

/// Environment variable naming an external test server.
pub const TEST_DATABASE_URL_ENV: &str = "ATELIER_TEST_DATABASE_URL";

/// SQL creating the full schema.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_tracker_tables/up.sql");

/// Template database holding the migrated schema.
pub const TEMPLATE_DB: &str = "atelier_test_template";

#[derive(Debug)]
struct SearchPath(String);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for SearchPath {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!("SET search_path TO {}", self.0))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

enum Isolation {
    Database {
        cluster: &'static ManagedCluster,
        name: String,
    },
    Schema {
        url: String,
        name: String,
    },
}

/// A migrated database private to one test.
pub struct TestDatabase {
    isolation: Isolation,
    pub pool: TrackerPgPool,
}

impl TestDatabase {
    /// Clones the migrated template into a fresh database on `cluster`.
    pub fn on_cluster(cluster: &'static ManagedCluster) -> Result<Self, BoxError> {
        cluster.ensure_template(TEMPLATE_DB, |url| {
            let mut conn = PgConnection::establish(url)?;
            conn.batch_execute(CREATE_SCHEMA_SQL)?;
            Ok(())
        })?;
        let name = format!("atelier_test_{}", Uuid::new_v4().simple());
        cluster.create_database_from_template(&name, TEMPLATE_DB)?;
        let pool = Pool::builder()
            .max_size(4)
            .build(ConnectionManager::<PgConnection>::new(
                cluster.database_url(&name),
            ))?;
        Ok(Self {
            isolation: Isolation::Database { cluster, name },
            pool,
        })
    }

    /// Creates and migrates a fresh schema on the server at `url`.
    pub fn on_server(url: String) -> Result<Self, BoxError> {
        let name = format!("atelier_test_{}", Uuid::new_v4().simple());
        let mut conn = PgConnection::establish(&url)?;
        conn.batch_execute(&format!(
            "CREATE SCHEMA {name}; SET search_path TO {name}; {CREATE_SCHEMA_SQL}"
        ))?;
        let pool = Pool::builder()
            .max_size(4)
            .connection_customizer(Box::new(SearchPath(name.clone())))
            .build(ConnectionManager::<PgConnection>::new(url.clone()))?;
        Ok(Self {
            isolation: Isolation::Schema { url, name },
            pool,
        })
    }

    /// Inserts a user directly and returns the identity it acts under.
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    #[must_use]
    pub fn register(&self, name: &str, role: Role) -> Actor {
        let user = User::new(name, format!("{name}@example.com"), role);
        let mut conn = self.pool.get().expect("pooled connection");
        diesel::sql_query("INSERT INTO users (id, name, email, role) VALUES ($1, $2, $3, $4)")
            .bind::<SqlUuid, _>(user.id.into_inner())
            .bind::<Nullable<Text>, _>(user.name.clone())
            .bind::<Nullable<Text>, _>(user.email.clone())
            .bind::<Text, _>(user.role.as_str())
            .execute(&mut conn)
            .expect("insert user");
        user.as_actor()
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        match &self.isolation {
            Isolation::Database { cluster, name } => drop(cluster.drop_database(name)),
            Isolation::Schema { url, name } => {
                if let Ok(mut conn) = PgConnection::establish(url) {
                    drop(conn.batch_execute(&format!("DROP SCHEMA IF EXISTS {name} CASCADE")));
                }
            }
        }
    }
}

/// Provides a migrated database on the external server when one is
/// configured, and on the shared embedded cluster otherwise.
///
/// # Panics
///
/// Panics when the database cannot be prepared.
#[fixture]
pub fn database() -> TestDatabase {
    let prepared = match std::env::var(TEST_DATABASE_URL_ENV) {
        Ok(url) => TestDatabase::on_server(url),
        Err(_) => TestDatabase::on_cluster(shared_cluster()),
    };
    prepared.unwrap_or_else(|err| panic!("failed to prepare test database: {err}"))
}
