//! `PostgreSQL` adapter for transactional tracker persistence.

pub(crate) mod models;
mod records;
pub(crate) mod schema;
mod store;

pub use store::{PostgresTrackerStore, TrackerPgPool};
