//! Project use-cases.

use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::ports::ProjectService;
use crate::domain::survey::{Project, ProjectDraft, ProjectId, ProjectPatch};
use crate::domain::survey_access::{SurveyRepositories, map_profile_error, map_project_error};
use crate::domain::{CallerIdentity, Error, UserProfile};

/// Project service enforcing ownership and geometry validation.
#[derive(Clone)]
pub struct SurveyProjectService {
    repos: SurveyRepositories,
}

impl SurveyProjectService {
    /// Create a service over the shared repository bundle.
    pub fn new(repos: SurveyRepositories) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl ProjectService for SurveyProjectService {
    async fn list(&self, caller: &CallerIdentity, page: PageParams) -> Result<Vec<Project>, Error> {
        self.repos
            .projects
            .list_for_owner(caller.id(), page)
            .await
            .map_err(map_project_error)
    }

    async fn get(&self, caller: &CallerIdentity, id: ProjectId) -> Result<Project, Error> {
        self.repos.owned_project(caller, id).await
    }

    async fn create(
        &self,
        caller: &CallerIdentity,
        draft: ProjectDraft,
        generate_stations: bool,
    ) -> Result<Project, Error> {
        let now = self.repos.clock.utc();
        let project = draft.into_new_project(caller.id().clone(), now)?;
        let seeds = if generate_stations {
            project.geometry.station_plan()?
        } else {
            Vec::new()
        };

        // Projects reference the owner's profile row.
        self.repos
            .profiles
            .ensure(&UserProfile::for_caller(caller, now))
            .await
            .map_err(map_profile_error)?;

        self.repos
            .projects
            .insert(&project, &seeds)
            .await
            .map_err(map_project_error)
    }

    async fn update(
        &self,
        caller: &CallerIdentity,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, Error> {
        let current = self.repos.owned_project(caller, id).await?;
        let updated = patch.apply(current, self.repos.clock.utc())?;
        self.repos
            .projects
            .update(&updated)
            .await
            .map_err(map_project_error)
    }

    async fn delete(&self, caller: &CallerIdentity, id: ProjectId) -> Result<(), Error> {
        self.repos.owned_project(caller, id).await?;
        let removed = self
            .repos
            .projects
            .delete(id)
            .await
            .map_err(map_project_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(format!("project {id} not found")))
        }
    }
}

#[cfg(test)]
#[path = "project_service_tests.rs"]
mod tests;
