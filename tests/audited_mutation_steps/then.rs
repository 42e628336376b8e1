//! Then steps for audited mutation BDD scenarios.

use std::time::Duration;

use super::world::{AuditWorld, run_async};
use atelier::audit::domain::SystemEventKind;
use atelier::tracker::domain::{HistoryAction, NotificationKind};
use eyre::WrapErr;
use rstest_bdd_macros::then;

#[then(r#"the task history holds only the creation of "{title}""#)]
fn history_holds_creation(world: &AuditWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let history =
        run_async(world.service.task_history(task_id)).wrap_err("load task history")?;

    match history.as_slice() {
        [entry]
            if entry.action == HistoryAction::Created
                && entry.old_value.is_empty()
                && entry.new_value == title =>
        {
            Ok(())
        }
        _ => Err(eyre::eyre!("unexpected history: {history:?}")),
    }
}

#[then(r#"the latest history entry is "{action}" from "{old}" to "{new}""#)]
fn latest_history_entry(
    world: &AuditWorld,
    action: String,
    old: String,
    new: String,
) -> Result<(), eyre::Report> {
    let action = HistoryAction::try_from(action.as_str())
        .map_err(|err| eyre::eyre!("invalid history action in scenario: {err}"))?;
    let task_id = world.task()?.id();
    let history =
        run_async(world.service.task_history(task_id)).wrap_err("load task history")?;
    let latest = history
        .last()
        .ok_or_else(|| eyre::eyre!("task history is empty"))?;

    if latest.action != action || latest.old_value != old || latest.new_value != new {
        return Err(eyre::eyre!("unexpected latest history entry: {latest:?}"));
    }
    Ok(())
}

#[then(r#""{recipient}" has a "{kind}" notification"#)]
fn has_notification(
    world: &AuditWorld,
    recipient: String,
    kind: String,
) -> Result<(), eyre::Report> {
    let kind = NotificationKind::try_from(kind.as_str())
        .map_err(|err| eyre::eyre!("invalid notification kind in scenario: {err}"))?;
    let recipient = world.known_user(&recipient)?;
    let inbox = world
        .tracker
        .notifications_to(recipient.id)
        .map_err(|err| eyre::eyre!("load notifications: {err}"))?;

    if !inbox.iter().any(|notification| notification.kind == kind) {
        return Err(eyre::eyre!(
            "expected {} notification, found {inbox:?}",
            kind.as_str()
        ));
    }
    Ok(())
}

#[then(r#"a "{kind}" system event is eventually processed"#)]
fn system_event_processed(world: &AuditWorld, kind: String) -> Result<(), eyre::Report> {
    let kind = SystemEventKind::try_from(kind.as_str())
        .map_err(|err| eyre::eyre!("invalid system event kind in scenario: {err}"))?;

    run_async(async {
        for _ in 0..200 {
            let events = world
                .audit
                .events()
                .map_err(|err| eyre::eyre!("load system events: {err}"))?;
            let matching: Vec<_> = events.iter().filter(|event| event.kind == kind).collect();
            if matching.len() == 1 && matching.iter().all(|event| event.processed) {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Err(eyre::eyre!("{} system event was not processed", kind.as_str()))
    })
}

#[then("no tasks, comments or history remain")]
fn nothing_remains(world: &AuditWorld) -> Result<(), eyre::Report> {
    let tasks = world.tracker.tasks().map_err(|err| eyre::eyre!("{err}"))?;
    let comments = world.tracker.comments().map_err(|err| eyre::eyre!("{err}"))?;
    let history = world.tracker.history().map_err(|err| eyre::eyre!("{err}"))?;

    if !(tasks.is_empty() && comments.is_empty() && history.is_empty()) {
        return Err(eyre::eyre!(
            "left behind {} tasks, {} comments, {} history entries",
            tasks.len(),
            comments.len(),
            history.len()
        ));
    }
    Ok(())
}

#[then(r#"the mutation fails with "{code}""#)]
fn mutation_fails_with(world: &AuditWorld, code: String) -> Result<(), eyre::Report> {
    let err = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the mutation to fail"))?;
    if err.code() != code {
        return Err(eyre::eyre!("expected {code}, got {err:?}"));
    }
    Ok(())
}

#[then("the project still exists")]
fn project_still_exists(world: &AuditWorld) -> Result<(), eyre::Report> {
    let project_id = world.project()?.id();
    let projects = world
        .tracker
        .projects()
        .map_err(|err| eyre::eyre!("load projects: {err}"))?;
    if !projects.iter().any(|project| project.id() == project_id) {
        return Err(eyre::eyre!("project {project_id} was deleted"));
    }
    Ok(())
}
