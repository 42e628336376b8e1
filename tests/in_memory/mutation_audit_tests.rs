//! Mutations observed end to end through the audit pipeline.

use super::helpers::{App, app, kinds};
use atelier::audit::domain::SystemEventKind;
use atelier::tracker::{
    domain::{HistoryAction, NotificationKind, TaskStatus},
    services::{AddCommentRequest, CreateProjectRequest, TaskDraft, UpdateTaskRequest},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assigned_task_creation_is_recorded_and_announced(app: App) {
    let project = app
        .service
        .create_project(&app.owner, CreateProjectRequest::new("Website"))
        .await
        .expect("create project");
    let task = app
        .service
        .create_task(
            &app.owner,
            TaskDraft::new(project.id(), "Write copy").with_assignee(Some(app.assignee.id)),
        )
        .await
        .expect("create task");

    let history = app.service.task_history(task.id()).await.expect("history");
    assert_eq!(history.len(), 1);
    let created = history.first().expect("creation entry");
    assert_eq!(created.action, HistoryAction::Created);
    assert_eq!(created.old_value, "");
    assert_eq!(created.new_value, "Write copy");

    let inbox = app
        .tracker
        .notifications_to(app.assignee.id)
        .expect("assignee notifications");
    assert_eq!(inbox.len(), 1);
    assert!(
        inbox
            .iter()
            .all(|notification| notification.kind == NotificationKind::TaskAssigned)
    );

    let events = app.settled_events(2).await;
    let mut recorded = kinds(&events);
    recorded.sort_by_key(|kind| kind.as_str());
    assert_eq!(
        recorded,
        vec![SystemEventKind::ProjectCreated, SystemEventKind::TaskCreated]
    );
    let mut messages = app.admin_messages();
    messages.sort();
    assert_eq!(
        messages,
        vec![
            r#"olga creó el proyecto "Website""#.to_owned(),
            r#"olga creó la tarea "Write copy""#.to_owned(),
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_a_task_notifies_the_assignee(app: App) {
    let project = app
        .service
        .create_project(&app.owner, CreateProjectRequest::new("Website"))
        .await
        .expect("create project");
    let task = app
        .service
        .create_task(
            &app.owner,
            TaskDraft::new(project.id(), "Write copy").with_assignee(Some(app.assignee.id)),
        )
        .await
        .expect("create task");

    app.service
        .update_task(
            &app.owner,
            UpdateTaskRequest::new(
                task.id(),
                TaskDraft::from_task(&task).with_status(TaskStatus::Completed),
            ),
        )
        .await
        .expect("complete task");

    let history = app.service.task_history(task.id()).await.expect("history");
    let last = history.last().expect("status entry");
    assert_eq!(last.action, HistoryAction::StatusChanged);
    assert_eq!((last.old_value.as_str(), last.new_value.as_str()), ("PENDING", "COMPLETED"));

    let kinds_received: Vec<NotificationKind> = app
        .tracker
        .notifications_to(app.assignee.id)
        .expect("assignee notifications")
        .into_iter()
        .map(|notification| notification.kind)
        .collect();
    assert!(kinds_received.contains(&NotificationKind::TaskCompleted));

    let events = app.settled_events(3).await;
    assert!(kinds(&events).contains(&SystemEventKind::TaskUpdated));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_deletion_cascades_and_is_recorded(app: App) {
    let project = app
        .service
        .create_project(&app.owner, CreateProjectRequest::new("Website"))
        .await
        .expect("create project");
    let task = app
        .service
        .create_task(&app.owner, TaskDraft::new(project.id(), "Write copy"))
        .await
        .expect("create task");
    app.service
        .add_comment(&app.owner, AddCommentRequest::new(task.id(), "Looks good"))
        .await
        .expect("comment");

    app.service
        .delete_project(&app.owner, project.id())
        .await
        .expect("delete project");

    assert!(app.tracker.tasks().expect("tasks").is_empty());
    assert!(app.tracker.comments().expect("comments").is_empty());
    assert!(app.tracker.history().expect("history").is_empty());

    let events = app.settled_events(4).await;
    assert!(kinds(&events).contains(&SystemEventKind::ProjectDeleted));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_mutation_records_nothing(app: App) {
    let project = app
        .service
        .create_project(&app.owner, CreateProjectRequest::new("Website"))
        .await
        .expect("create project");
    app.settled_events(1).await;

    let result = app
        .service
        .delete_project(&app.assignee, project.id())
        .await;

    assert_eq!(result.map_err(|err| err.code()), Err("FORBIDDEN"));
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(app.audit.events().expect("events").len(), 1);
    assert_eq!(app.tracker.projects().expect("projects").len(), 1);
}
