//! Domain model for the audit and admin notification pipeline.
//!
//! A [`SystemEvent`] is appended after every committed mutation and is
//! marked processed once admins have been notified about it.

mod alert;
mod details;
mod error;
mod event;

pub use alert::{AlertRenderer, MessageStyle, alert_notification_kind, mapped_notification_kind};
pub use details::{DetailValue, EventDetails};
pub use error::ParseSystemEventKindError;
pub use event::{AuditEvent, EventScope, SystemEvent, SystemEventId, SystemEventKind};
