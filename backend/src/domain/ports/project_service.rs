//! Driving port for project use-cases.

use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::survey::{Project, ProjectDraft, ProjectId, ProjectPatch};
use crate::domain::{CallerIdentity, Error};

/// Project operations scoped to the caller's own projects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectService: Send + Sync {
    /// List the caller's projects.
    async fn list(&self, caller: &CallerIdentity, page: PageParams) -> Result<Vec<Project>, Error>;

    /// Fetch one of the caller's projects.
    async fn get(&self, caller: &CallerIdentity, id: ProjectId) -> Result<Project, Error>;

    /// Create a project owned by the caller, optionally stamping stations
    /// along its range.
    async fn create(
        &self,
        caller: &CallerIdentity,
        draft: ProjectDraft,
        generate_stations: bool,
    ) -> Result<Project, Error>;

    /// Apply a partial update.
    async fn update(
        &self,
        caller: &CallerIdentity,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, Error>;

    /// Delete a project and everything under it.
    async fn delete(&self, caller: &CallerIdentity, id: ProjectId) -> Result<(), Error>;
}
