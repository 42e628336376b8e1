//! `PostgreSQL` adapters for the event store and admin inbox.

mod models;
mod schema;
mod store;

pub use store::PostgresAuditStore;
