//! Shared fixtures for tracker tests.

use std::sync::{Arc, Mutex};

use crate::audit::domain::{AuditEvent, SystemEventKind};
use crate::tracker::{
    adapters::memory::InMemoryTrackerStore,
    domain::{Actor, Project, ProjectId, Role, Task, TaskFields, TaskPriority, TaskStatus, User, UserId},
    ports::AuditTrail,
    services::{CreateProjectRequest, TaskDraft, TrackerService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Audit trail that keeps submitted events in memory.
#[derive(Debug, Default)]
pub(super) struct RecordingAuditTrail {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditTrail {
    pub(super) fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit trail lock").clone()
    }

    pub(super) fn kinds(&self) -> Vec<SystemEventKind> {
        self.events().into_iter().map(|event| event.kind).collect()
    }
}

impl AuditTrail for RecordingAuditTrail {
    fn submit(&self, event: AuditEvent) {
        self.events.lock().expect("audit trail lock").push(event);
    }
}

pub(super) type TestService =
    TrackerService<InMemoryTrackerStore, RecordingAuditTrail, DefaultClock>;

pub(super) struct Harness {
    pub(super) store: InMemoryTrackerStore,
    pub(super) audit: Arc<RecordingAuditTrail>,
    pub(super) service: TestService,
    pub(super) owner: Actor,
    pub(super) assignee: Actor,
    pub(super) stranger: Actor,
}

impl Harness {
    pub(super) async fn project(&self) -> Project {
        self.service
            .create_project(&self.owner, CreateProjectRequest::new("Website"))
            .await
            .expect("project creation should succeed")
    }

    pub(super) async fn assigned_task(&self, project: ProjectId) -> Task {
        self.service
            .create_task(
                &self.owner,
                TaskDraft::new(project, "Write copy").with_assignee(Some(self.assignee.id)),
            )
            .await
            .expect("task creation should succeed")
    }
}

fn register(store: &InMemoryTrackerStore, name: &str, role: Role) -> Actor {
    let user = User::new(name, format!("{name}@example.com"), role);
    store.add_user(user.clone()).expect("user registration");
    user.as_actor()
}

#[fixture]
pub(super) fn harness() -> Harness {
    let store = InMemoryTrackerStore::new();
    let audit = Arc::new(RecordingAuditTrail::default());
    let service = TrackerService::new(
        Arc::new(store.clone()),
        Arc::clone(&audit),
        Arc::new(DefaultClock),
    );
    Harness {
        owner: register(&store, "olga", Role::User),
        assignee: register(&store, "ana", Role::User),
        stranger: register(&store, "sam", Role::User),
        store,
        audit,
        service,
    }
}

/// Builds a standalone task for pure domain tests.
pub(super) fn detached_task(assignee: Option<UserId>, status: TaskStatus) -> Task {
    let fields = TaskFields {
        title: "Draft release notes".to_owned(),
        description: None,
        status,
        priority: TaskPriority::Medium,
        project_id: ProjectId::new(),
        assigned_to: assignee,
        due_date: None,
        estimated_hours: 2.0,
    }
    .validate()
    .expect("fields are valid");
    Task::create(fields, UserId::new(), &DefaultClock)
}

/// Returns `task` after applying `edit` to a full draft of its fields.
pub(super) fn edited(task: &Task, edit: impl FnOnce(TaskDraft) -> TaskDraft) -> Task {
    let mut updated = task.clone();
    let fields = edit(TaskDraft::from_task(task))
        .into_fields()
        .expect("edited fields are valid");
    updated
        .apply(fields, None, &DefaultClock)
        .expect("apply should succeed");
    updated
}
