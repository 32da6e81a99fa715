//! Driving port for theoretical station use-cases.

use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::survey::{ProjectId, Station, StationDraft, StationId, StationPatch};
use crate::domain::{CallerIdentity, Error};

/// Station operations scoped through the owning project.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StationService: Send + Sync {
    /// List stations of the caller's projects, ordered by km.
    async fn list(
        &self,
        caller: &CallerIdentity,
        project: Option<ProjectId>,
        page: PageParams,
    ) -> Result<Vec<Station>, Error>;

    /// List the stations of one project, failing when it is not the caller's.
    async fn list_for_project(
        &self,
        caller: &CallerIdentity,
        project: ProjectId,
        page: PageParams,
    ) -> Result<Vec<Station>, Error>;

    async fn get(&self, caller: &CallerIdentity, id: StationId) -> Result<Station, Error>;

    async fn create(&self, caller: &CallerIdentity, draft: StationDraft) -> Result<Station, Error>;

    async fn update(
        &self,
        caller: &CallerIdentity,
        id: StationId,
        patch: StationPatch,
    ) -> Result<Station, Error>;

    async fn delete(&self, caller: &CallerIdentity, id: StationId) -> Result<(), Error>;
}
