//! Adapter implementations for the audit pipeline ports.

pub mod memory;
pub mod postgres;
