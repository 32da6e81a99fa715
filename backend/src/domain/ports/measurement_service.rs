//! Driving port for field measurement use-cases.

use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::survey::{
    Measurement, MeasurementDraft, MeasurementId, MeasurementPatch, ProjectId,
};
use crate::domain::{CallerIdentity, Error};

/// Measurement operations scoped through the owning project.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeasurementService: Send + Sync {
    /// List measurements of the caller's projects, ordered by station km.
    async fn list(
        &self,
        caller: &CallerIdentity,
        project: Option<ProjectId>,
        page: PageParams,
    ) -> Result<Vec<Measurement>, Error>;

    /// List the measurements of one project, failing when it is not the
    /// caller's.
    async fn list_for_project(
        &self,
        caller: &CallerIdentity,
        project: ProjectId,
        page: PageParams,
    ) -> Result<Vec<Measurement>, Error>;

    async fn get(&self, caller: &CallerIdentity, id: MeasurementId) -> Result<Measurement, Error>;

    async fn create(
        &self,
        caller: &CallerIdentity,
        draft: MeasurementDraft,
    ) -> Result<Measurement, Error>;

    async fn update(
        &self,
        caller: &CallerIdentity,
        id: MeasurementId,
        patch: MeasurementPatch,
    ) -> Result<Measurement, Error>;

    /// Delete a measurement and its readings.
    async fn delete(&self, caller: &CallerIdentity, id: MeasurementId) -> Result<(), Error>;
}
