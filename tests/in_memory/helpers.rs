//! Shared test helpers for in-memory integration tests.

use atelier::audit::{
    adapters::memory::InMemoryAuditStore,
    domain::{SystemEvent, SystemEventKind},
    services::{AuditPipeline, EventRecorder},
};
use atelier::config::PipelineConfig;
use atelier::tracker::{
    adapters::memory::InMemoryTrackerStore,
    domain::{Actor, Role, User},
    services::TrackerService,
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;
use std::time::Duration;

/// Recorder wired over the in-memory stores.
pub type MemoryRecorder = EventRecorder<InMemoryAuditStore, InMemoryAuditStore, DefaultClock>;

/// Tracker service whose audit trail is the real recorder.
pub type MemoryService = TrackerService<InMemoryTrackerStore, MemoryRecorder, DefaultClock>;

/// Fully wired application over in-memory storage.
pub struct App {
    pub tracker: InMemoryTrackerStore,
    pub audit: InMemoryAuditStore,
    pub pipeline: AuditPipeline<InMemoryAuditStore, InMemoryAuditStore, DefaultClock>,
    pub service: MemoryService,
    pub admin: Actor,
    pub owner: Actor,
    pub assignee: Actor,
}

impl App {
    /// Builds the application with one administrator and two users.
    ///
    /// # Panics
    ///
    /// Panics if user registration fails.
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        let tracker = InMemoryTrackerStore::new();
        let audit = InMemoryAuditStore::new(tracker.clone());
        let shared = Arc::new(audit.clone());
        let pipeline = AuditPipeline::new(
            Arc::clone(&shared),
            shared,
            Arc::new(DefaultClock),
            config,
        );
        let service = TrackerService::new(
            Arc::new(tracker.clone()),
            pipeline.recorder(),
            Arc::new(DefaultClock),
        );
        let register = |name: &str, role: Role| {
            let user = User::new(name, format!("{name}@example.com"), role);
            tracker.add_user(user.clone()).expect("user registration");
            user.as_actor()
        };
        let admin = register("root", Role::Admin);
        let owner = register("olga", Role::User);
        let assignee = register("ana", Role::User);
        Self {
            tracker: tracker.clone(),
            audit,
            pipeline,
            service,
            admin,
            owner,
            assignee,
        }
    }

    /// Waits until `count` events exist and all of them are processed.
    ///
    /// # Panics
    ///
    /// Panics if that does not happen within two seconds.
    pub async fn settled_events(&self, count: usize) -> Vec<SystemEvent> {
        for _ in 0..200 {
            let events = self.audit.events().expect("events");
            if events.len() == count && events.iter().all(|event| event.processed) {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {count} processed system events");
    }

    /// Waits until `count` events exist, processed or not.
    ///
    /// # Panics
    ///
    /// Panics if that does not happen within two seconds.
    pub async fn recorded_events(&self, count: usize) -> Vec<SystemEvent> {
        for _ in 0..200 {
            let events = self.audit.events().expect("events");
            if events.len() == count {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {count} recorded system events");
    }

    /// Messages delivered to the administrator.
    ///
    /// # Panics
    ///
    /// Panics if the notification table cannot be read.
    #[must_use]
    pub fn admin_messages(&self) -> Vec<String> {
        self.tracker
            .notifications_to(self.admin.id)
            .expect("admin notifications")
            .into_iter()
            .map(|notification| notification.message)
            .collect()
    }
}

/// Kinds of `events`, in storage order.
#[must_use]
pub fn kinds(events: &[SystemEvent]) -> Vec<SystemEventKind> {
    events.iter().map(|event| event.kind).collect()
}

/// Provides an application with the default pipeline configuration.
#[fixture]
pub fn app() -> App {
    App::new(&PipelineConfig::default())
}
