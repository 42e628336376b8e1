//! Outbound port for post-commit audit events.

use crate::audit::domain::AuditEvent;

/// Receives audit events for committed mutations.
///
/// Submitting never fails and never waits for the event to be stored; the
/// mutation that triggered it has already been committed.
pub trait AuditTrail: Send + Sync {
    /// Hands an event over for recording.
    fn submit(&self, event: AuditEvent);
}
