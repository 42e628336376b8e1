//! Port contracts for the audit event pipeline.

pub mod admin_inbox;
pub mod event_store;

pub use admin_inbox::AdminInbox;
pub use event_store::{AuditStoreError, AuditStoreResult, SystemEventStore};
