//! Project aggregate.

use super::{ProjectId, TrackerDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Maximum project name length in characters.
pub const PROJECT_NAME_MAX: usize = 255;
/// Maximum project description length in characters.
pub const PROJECT_DESCRIPTION_MAX: usize = 1000;

/// A project owning zero or more tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: String,
    description: Option<String>,
    created_by: UserId,
    created_at: DateTime<Utc>,
}

impl Project {
    /// Creates a validated project owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError`] when the name is empty or a field is
    /// too long.
    pub fn new(
        name: &str,
        description: Option<String>,
        owner: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TrackerDomainError> {
        Ok(Self {
            id: ProjectId::new(),
            name: TrackerDomainError::require_text("project name", name, PROJECT_NAME_MAX)?,
            description: TrackerDomainError::optional_text(
                "project description",
                description,
                PROJECT_DESCRIPTION_MAX,
            )?,
            created_by: owner,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(
        id: ProjectId,
        name: String,
        description: Option<String>,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            created_by,
            created_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the creator and owner of the project.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` when `user` created this project.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.created_by == user
    }

    /// Replaces the name and description.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError`] when validation fails; the project is
    /// left unchanged.
    pub fn rename(
        &mut self,
        name: &str,
        description: Option<String>,
    ) -> Result<(), TrackerDomainError> {
        let validated_name =
            TrackerDomainError::require_text("project name", name, PROJECT_NAME_MAX)?;
        let validated_description = TrackerDomainError::optional_text(
            "project description",
            description,
            PROJECT_DESCRIPTION_MAX,
        )?;
        self.name = validated_name;
        self.description = validated_description;
        Ok(())
    }
}
