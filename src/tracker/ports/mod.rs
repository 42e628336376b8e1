//! Port contracts for tracker mutations.

pub mod audit_trail;
pub mod store;

pub use audit_trail::AuditTrail;
pub use store::{
    CommentRecords, HistoryRecords, NotificationRecords, ProjectRecords, TaskRecords,
    TrackerStore, TrackerStoreError, TrackerStoreResult, TrackerTransaction,
};
