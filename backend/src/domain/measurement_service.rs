//! Field measurement use-cases.

use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::ports::MeasurementService;
use crate::domain::survey::{
    Measurement, MeasurementDraft, MeasurementId, MeasurementPatch, ProjectId,
};
use crate::domain::survey_access::{SurveyRepositories, map_measurement_error};
use crate::domain::{CallerIdentity, Error};

/// Measurement service; every operation resolves ownership through the
/// project.
#[derive(Clone)]
pub struct SurveyMeasurementService {
    repos: SurveyRepositories,
}

impl SurveyMeasurementService {
    /// Create a service over the shared repository bundle.
    pub fn new(repos: SurveyRepositories) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl MeasurementService for SurveyMeasurementService {
    async fn list(
        &self,
        caller: &CallerIdentity,
        project: Option<ProjectId>,
        page: PageParams,
    ) -> Result<Vec<Measurement>, Error> {
        self.repos
            .measurements
            .list_for_owner(caller.id(), project, page)
            .await
            .map_err(map_measurement_error)
    }

    async fn list_for_project(
        &self,
        caller: &CallerIdentity,
        project: ProjectId,
        page: PageParams,
    ) -> Result<Vec<Measurement>, Error> {
        self.repos.owned_project(caller, project).await?;
        self.list(caller, Some(project), page).await
    }

    async fn get(&self, caller: &CallerIdentity, id: MeasurementId) -> Result<Measurement, Error> {
        let (measurement, _) = self.repos.owned_measurement(caller, id).await?;
        Ok(measurement)
    }

    async fn create(
        &self,
        caller: &CallerIdentity,
        draft: MeasurementDraft,
    ) -> Result<Measurement, Error> {
        let project = self.repos.owned_project(caller, draft.proyecto_id).await?;
        let today = self.repos.clock.utc().date_naive();
        let measurement = draft.into_new_measurement(&project.geometry, today)?;
        self.repos
            .measurements
            .insert(&measurement)
            .await
            .map_err(map_measurement_error)
    }

    async fn update(
        &self,
        caller: &CallerIdentity,
        id: MeasurementId,
        patch: MeasurementPatch,
    ) -> Result<Measurement, Error> {
        let (current, project) = self.repos.owned_measurement(caller, id).await?;
        let updated = patch.apply(current, &project.geometry)?;
        self.repos
            .measurements
            .update(&updated)
            .await
            .map_err(map_measurement_error)
    }

    async fn delete(&self, caller: &CallerIdentity, id: MeasurementId) -> Result<(), Error> {
        self.repos.owned_measurement(caller, id).await?;
        let removed = self
            .repos
            .measurements
            .delete(id)
            .await
            .map_err(map_measurement_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(format!("measurement {id} not found")))
        }
    }
}

#[cfg(test)]
#[path = "measurement_service_tests.rs"]
mod tests;
