//! When steps for audited mutation BDD scenarios.

use super::world::{AuditWorld, run_async};
use atelier::tracker::{
    domain::TaskStatus,
    services::{TaskDraft, UpdateTaskRequest},
};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when(r#""{creator}" creates the task "{title}" assigned to "{assignee}""#)]
fn creates_assigned_task(
    world: &mut AuditWorld,
    creator: String,
    title: String,
    assignee: String,
) -> Result<(), eyre::Report> {
    let creator = world.user(&creator)?;
    let assignee = world.user(&assignee)?;
    let project_id = world.project()?.id();
    let task = run_async(world.service.create_task(
        &creator,
        TaskDraft::new(project_id, title).with_assignee(Some(assignee.id)),
    ))
    .wrap_err("create assigned task")?;
    world.task = Some(task);
    Ok(())
}

#[when(r#""{editor}" sets the task status to "{status}""#)]
fn sets_task_status(
    world: &mut AuditWorld,
    editor: String,
    status: String,
) -> Result<(), eyre::Report> {
    let status = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let editor = world.known_user(&editor)?.clone();
    let task = world.task()?.clone();
    let updated = run_async(world.service.update_task(
        &editor,
        UpdateTaskRequest::new(task.id(), TaskDraft::from_task(&task).with_status(status)),
    ))
    .wrap_err("update task status")?;
    world.task = Some(updated);
    Ok(())
}

#[when(r#""{caller}" deletes the project"#)]
fn deletes_project(world: &mut AuditWorld, caller: String) -> Result<(), eyre::Report> {
    let caller = world.user(&caller)?;
    let project_id = world.project()?.id();
    if let Err(err) = run_async(world.service.delete_project(&caller, project_id)) {
        world.last_error = Some(err);
    }
    Ok(())
}
