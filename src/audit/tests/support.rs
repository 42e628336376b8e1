//! Shared fixtures for audit tests.

use crate::audit::{
    adapters::memory::InMemoryAuditStore,
    domain::{AuditEvent, EventDetails, EventScope, SystemEvent, SystemEventKind},
};
use crate::tracker::{
    adapters::memory::InMemoryTrackerStore,
    domain::{Actor, ProjectId, Role, User, UserId},
};
use mockable::DefaultClock;

pub(super) fn project_event(kind: SystemEventKind, name: &str) -> AuditEvent {
    AuditEvent::new(
        kind,
        Actor::new(UserId::new(), "Olga"),
        EventScope::project(ProjectId::new()),
        format!("Created project: {name}"),
    )
    .with_details(EventDetails::new().with("project_name", name))
}

pub(super) fn stored_event(kind: SystemEventKind, name: &str) -> SystemEvent {
    SystemEvent::pending(project_event(kind, name), &DefaultClock)
}

/// Tracker store with `admins` administrators and one regular user.
pub(super) fn store_with_admins(admins: usize) -> (InMemoryTrackerStore, InMemoryAuditStore) {
    let tracker = InMemoryTrackerStore::new();
    for index in 0..admins {
        tracker
            .add_user(User::new(
                format!("admin{index}"),
                format!("admin{index}@example.com"),
                Role::Admin,
            ))
            .expect("admin registration");
    }
    tracker
        .add_user(User::new("user", "user@example.com", Role::User))
        .expect("user registration");
    let audit = InMemoryAuditStore::new(tracker.clone());
    (tracker, audit)
}
