//! Shared world state for audited mutation BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use atelier::audit::{
    adapters::memory::InMemoryAuditStore,
    services::{AuditPipeline, EventRecorder},
};
use atelier::config::PipelineConfig;
use atelier::tracker::{
    adapters::memory::InMemoryTrackerStore,
    domain::{Actor, Project, Role, Task, User},
    services::{TrackerService, TrackerServiceError},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Recorder used as the service's audit trail.
pub type WorldRecorder = EventRecorder<InMemoryAuditStore, InMemoryAuditStore, DefaultClock>;

/// Service type used by the BDD world.
pub type WorldService = TrackerService<InMemoryTrackerStore, WorldRecorder, DefaultClock>;

/// Scenario world for audited mutation behaviour tests.
pub struct AuditWorld {
    pub tracker: InMemoryTrackerStore,
    pub audit: InMemoryAuditStore,
    pub service: WorldService,
    pub users: HashMap<String, Actor>,
    pub project: Option<Project>,
    pub task: Option<Task>,
    pub last_error: Option<TrackerServiceError>,
}

impl AuditWorld {
    /// Creates a world with one administrator and no other users.
    ///
    /// # Panics
    ///
    /// Panics if the administrator cannot be registered.
    #[must_use]
    pub fn new() -> Self {
        let tracker = InMemoryTrackerStore::new();
        let audit = InMemoryAuditStore::new(tracker.clone());
        let shared = Arc::new(audit.clone());
        let pipeline = AuditPipeline::new(
            Arc::clone(&shared),
            shared,
            Arc::new(DefaultClock),
            &PipelineConfig::default(),
        );
        let service = TrackerService::new(
            Arc::new(tracker.clone()),
            pipeline.recorder(),
            Arc::new(DefaultClock),
        );
        tracker
            .add_user(User::new("root", "root@example.com", Role::Admin))
            .expect("admin registration");

        Self {
            tracker,
            audit,
            service,
            users: HashMap::new(),
            project: None,
            task: None,
            last_error: None,
        }
    }

    /// Returns the actor called `name`, registering a regular user first if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails.
    pub fn user(&mut self, name: &str) -> Result<Actor, eyre::Report> {
        if let Some(actor) = self.users.get(name) {
            return Ok(actor.clone());
        }
        let user = User::new(name, format!("{name}@example.com"), Role::User);
        self.tracker
            .add_user(user.clone())
            .map_err(|err| eyre::eyre!("register {name}: {err}"))?;
        let actor = user.as_actor();
        self.users.insert(name.to_owned(), actor.clone());
        Ok(actor)
    }

    /// Returns the actor registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if no such user was registered.
    pub fn known_user(&self, name: &str) -> Result<&Actor, eyre::Report> {
        self.users
            .get(name)
            .ok_or_else(|| eyre::eyre!("unknown user {name} in scenario world"))
    }

    /// Returns the registered creator of `project`.
    ///
    /// # Errors
    ///
    /// Returns an error if the creator is not a scenario user.
    pub fn user_owning(&self, project: &Project) -> Result<Actor, eyre::Report> {
        self.users
            .values()
            .find(|actor| project.is_owned_by(actor.id))
            .cloned()
            .ok_or_else(|| eyre::eyre!("project owner is not a scenario user"))
    }

    /// Returns the scenario project.
    ///
    /// # Errors
    ///
    /// Returns an error if no project was created.
    pub fn project(&self) -> Result<&Project, eyre::Report> {
        self.project
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing project in scenario world"))
    }

    /// Returns the scenario task.
    ///
    /// # Errors
    ///
    /// Returns an error if no task was created.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for AuditWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> AuditWorld {
    AuditWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
