//! System event recording and administrator alerts.
//!
//! Every committed tracker mutation submits an [`domain::AuditEvent`]. The
//! [`services::EventRecorder`] stores it as a [`domain::SystemEvent`] and
//! tries to notify administrators at once; the periodic
//! [`services::EventProcessor`] sweep picks up whatever the immediate path
//! left unprocessed. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
