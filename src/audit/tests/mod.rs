//! Unit tests for the audit module.

mod support;
