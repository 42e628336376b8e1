//! Project, task and comment mutations.
//!
//! Each mutation writes its row, field history and direct notifications in
//! one transaction and then hands an audit event to the [`ports::AuditTrail`]
//! without waiting for it. The module follows hexagonal architecture:
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
