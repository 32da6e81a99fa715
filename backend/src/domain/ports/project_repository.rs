//! Port abstraction for project persistence.
use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::UserId;
use crate::domain::survey::{NewProject, Project, ProjectId, StationSeed};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by project repository adapters.
    pub enum ProjectRepositoryError for "project" repository {
        /// The project disappeared before the write landed.
        Missing { id: i32 } => "project {id} no longer exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a project together with its generated stations in one
    /// transaction.
    async fn insert(
        &self,
        project: &NewProject,
        stations: &[StationSeed],
    ) -> Result<Project, ProjectRepositoryError>;

    /// Fetch a project by identifier, regardless of owner.
    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, ProjectRepositoryError>;

    /// List the projects owned by `owner`, ordered by identifier.
    async fn list_for_owner(
        &self,
        owner: &UserId,
        page: PageParams,
    ) -> Result<Vec<Project>, ProjectRepositoryError>;

    /// Overwrite an existing project.
    async fn update(&self, project: &Project) -> Result<Project, ProjectRepositoryError>;

    /// Delete a project, cascading to its stations, measurements and
    /// readings. Returns whether a row was removed.
    async fn delete(&self, id: ProjectId) -> Result<bool, ProjectRepositoryError>;
}
