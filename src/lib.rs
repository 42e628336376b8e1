//! Atelier: task tracking with an audited admin notification pipeline.
//!
//! Mutations on projects, tasks and comments are transactional: the row,
//! its field-level history and the notifications it triggers commit
//! together. After the commit an audit event is recorded on a detached task
//! and administrators are alerted, either at once or by a periodic sweep.
//!
//! # Architecture
//!
//! Both contexts follow hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: In-memory and `PostgreSQL` implementations of ports
//!
//! # Modules
//!
//! - [`tracker`]: Projects, tasks, comments, history and user notifications
//! - [`audit`]: System events, admin alerts and the sweep
//! - [`config`]: Pipeline settings

pub mod audit;
pub mod config;
pub mod tracker;
