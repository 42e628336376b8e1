//! Project mutations.

use super::{
    CreateProjectRequest, Resource, TrackerService, TrackerServiceError, TrackerServiceResult,
    UpdateProjectRequest,
};
use crate::audit::domain::{AuditEvent, EventDetails, EventScope, SystemEventKind};
use crate::tracker::{
    domain::{Actor, Project, ProjectId, UserId},
    ports::{AuditTrail, ProjectRecords, TrackerStore},
};
use mockable::Clock;

/// Loads a project the caller owns.
fn owned_project<R>(
    records: &mut R,
    project_id: ProjectId,
    caller: UserId,
    denial: &'static str,
) -> TrackerServiceResult<Project>
where
    R: ProjectRecords + ?Sized,
{
    let project = records
        .find_project(project_id)?
        .ok_or(TrackerServiceError::NotFound(Resource::Project(project_id)))?;
    if !project.is_owned_by(caller) {
        return Err(TrackerServiceError::Forbidden(denial));
    }
    Ok(project)
}

fn project_event(kind: SystemEventKind, actor: &Actor, project: &Project, verb: &str) -> AuditEvent {
    AuditEvent::new(
        kind,
        actor.clone(),
        EventScope::project(project.id()),
        format!("{verb} project: {}", project.name()),
    )
    .with_details(EventDetails::new().with("project_name", project.name()))
}

impl<S, A, C> TrackerService<S, A, C>
where
    S: TrackerStore,
    A: AuditTrail + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a project owned by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Invalid`] when the name or description
    /// is invalid, or [`TrackerServiceError::Store`] when persistence fails.
    pub async fn create_project(
        &self,
        actor: &Actor,
        request: CreateProjectRequest,
    ) -> TrackerServiceResult<Project> {
        let project = Project::new(&request.name, request.description, actor.id, &*self.clock)?;
        let stored = project.clone();
        self.store
            .transaction(move |tx| {
                tx.insert_project(&stored)?;
                Ok::<_, TrackerServiceError>(())
            })
            .await?;

        self.audit(project_event(
            SystemEventKind::ProjectCreated,
            actor,
            &project,
            "Created",
        ));
        Ok(project)
    }

    /// Renames a project owned by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`], [`TrackerServiceError::Forbidden`]
    /// when the caller is not the creator, [`TrackerServiceError::Invalid`] or
    /// [`TrackerServiceError::Store`].
    pub async fn update_project(
        &self,
        actor: &Actor,
        request: UpdateProjectRequest,
    ) -> TrackerServiceResult<Project> {
        let caller = actor.id;
        let project = self
            .store
            .transaction(move |tx| {
                let mut project = owned_project(
                    &mut *tx,
                    request.project_id,
                    caller,
                    "You can only update projects you created",
                )?;
                project.rename(&request.name, request.description)?;
                tx.update_project(&project)?;
                Ok::<_, TrackerServiceError>(project)
            })
            .await?;

        self.audit(project_event(
            SystemEventKind::ProjectUpdated,
            actor,
            &project,
            "Updated",
        ));
        Ok(project)
    }

    /// Deletes a project owned by `actor` together with its tasks, their
    /// comments and history.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`], [`TrackerServiceError::Forbidden`]
    /// when the caller is not the creator, or [`TrackerServiceError::Store`].
    pub async fn delete_project(
        &self,
        actor: &Actor,
        project_id: ProjectId,
    ) -> TrackerServiceResult<ProjectId> {
        let caller = actor.id;
        let project = self
            .store
            .transaction(move |tx| {
                let project = owned_project(
                    &mut *tx,
                    project_id,
                    caller,
                    "You can only delete projects you created",
                )?;
                tx.delete_project(project_id)?;
                Ok::<_, TrackerServiceError>(project)
            })
            .await?;

        self.audit(project_event(
            SystemEventKind::ProjectDeleted,
            actor,
            &project,
            "Deleted",
        ));
        Ok(project_id)
    }
}
