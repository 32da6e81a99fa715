//! Theoretical station use-cases.

use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::ports::StationService;
use crate::domain::survey::{ProjectId, Station, StationDraft, StationId, StationPatch};
use crate::domain::survey_access::{SurveyRepositories, map_station_error};
use crate::domain::{CallerIdentity, Error};

/// Station service; every operation resolves ownership through the project.
#[derive(Clone)]
pub struct SurveyStationService {
    repos: SurveyRepositories,
}

impl SurveyStationService {
    /// Create a service over the shared repository bundle.
    pub fn new(repos: SurveyRepositories) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl StationService for SurveyStationService {
    async fn list(
        &self,
        caller: &CallerIdentity,
        project: Option<ProjectId>,
        page: PageParams,
    ) -> Result<Vec<Station>, Error> {
        self.repos
            .stations
            .list_for_owner(caller.id(), project, page)
            .await
            .map_err(map_station_error)
    }

    async fn list_for_project(
        &self,
        caller: &CallerIdentity,
        project: ProjectId,
        page: PageParams,
    ) -> Result<Vec<Station>, Error> {
        self.repos.owned_project(caller, project).await?;
        self.list(caller, Some(project), page).await
    }

    async fn get(&self, caller: &CallerIdentity, id: StationId) -> Result<Station, Error> {
        let (station, _) = self.repos.owned_station(caller, id).await?;
        Ok(station)
    }

    async fn create(&self, caller: &CallerIdentity, draft: StationDraft) -> Result<Station, Error> {
        let project = self.repos.owned_project(caller, draft.proyecto_id).await?;
        let station = draft.into_new_station(&project.geometry, self.repos.clock.utc())?;
        self.repos
            .stations
            .insert(&station)
            .await
            .map_err(map_station_error)
    }

    async fn update(
        &self,
        caller: &CallerIdentity,
        id: StationId,
        patch: StationPatch,
    ) -> Result<Station, Error> {
        let (current, project) = self.repos.owned_station(caller, id).await?;
        let updated = patch.apply(current, &project.geometry)?;
        self.repos
            .stations
            .update(&updated)
            .await
            .map_err(map_station_error)
    }

    async fn delete(&self, caller: &CallerIdentity, id: StationId) -> Result<(), Error> {
        self.repos.owned_station(caller, id).await?;
        let removed = self
            .repos
            .stations
            .delete(id)
            .await
            .map_err(map_station_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(format!("station {id} not found")))
        }
    }
}

#[cfg(test)]
#[path = "station_service_tests.rs"]
mod tests;
