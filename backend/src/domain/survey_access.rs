//! Repository bundle shared by the survey services, with the ownership gate
//! and repository error mapping they have in common.
//!
//! Stations, measurements and readings carry no owner of their own; every
//! lookup resolves the owning project and compares its owner with the caller.
//! An entity that exists but belongs to someone else is reported exactly like
//! one that does not exist.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;

use crate::domain::ports::{
    MeasurementRepository, MeasurementRepositoryError, ProjectRepository, ProjectRepositoryError,
    ReadingRepository, ReadingRepositoryError, StationRepository, StationRepositoryError,
    UserProfileRepository, UserProfileRepositoryError,
};
use crate::domain::survey::{
    DivisionReading, Measurement, MeasurementId, Project, ProjectId, ReadingId, Station, StationId,
};
use crate::domain::{CallerIdentity, Error};

/// Driven ports and clock consumed by the survey services.
#[derive(Clone)]
pub struct SurveyRepositories {
    pub profiles: Arc<dyn UserProfileRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub stations: Arc<dyn StationRepository>,
    pub measurements: Arc<dyn MeasurementRepository>,
    pub readings: Arc<dyn ReadingRepository>,
    pub clock: Arc<dyn Clock>,
}

impl SurveyRepositories {
    async fn find_owned_project(
        &self,
        caller: &CallerIdentity,
        id: ProjectId,
    ) -> Result<Option<Project>, Error> {
        Ok(self
            .projects
            .find_by_id(id)
            .await
            .map_err(map_project_error)?
            .filter(|project| project.is_owned_by(caller.id())))
    }

    /// The project `id` when the caller owns it.
    pub(crate) async fn owned_project(
        &self,
        caller: &CallerIdentity,
        id: ProjectId,
    ) -> Result<Project, Error> {
        self.find_owned_project(caller, id)
            .await?
            .ok_or_else(|| Error::not_found(format!("project {id} not found")))
    }

    /// The station `id` and its project when the caller owns the project.
    pub(crate) async fn owned_station(
        &self,
        caller: &CallerIdentity,
        id: StationId,
    ) -> Result<(Station, Project), Error> {
        let not_found = || Error::not_found(format!("station {id} not found"));
        let station = self
            .stations
            .find_by_id(id)
            .await
            .map_err(map_station_error)?
            .ok_or_else(not_found)?;
        let project = self
            .find_owned_project(caller, station.proyecto_id)
            .await?
            .ok_or_else(not_found)?;
        Ok((station, project))
    }

    /// The measurement `id` and its project when the caller owns the project.
    pub(crate) async fn owned_measurement(
        &self,
        caller: &CallerIdentity,
        id: MeasurementId,
    ) -> Result<(Measurement, Project), Error> {
        let not_found = || Error::not_found(format!("measurement {id} not found"));
        let measurement = self
            .measurements
            .find_by_id(id)
            .await
            .map_err(map_measurement_error)?
            .ok_or_else(not_found)?;
        let project = self
            .find_owned_project(caller, measurement.proyecto_id)
            .await?
            .ok_or_else(not_found)?;
        Ok((measurement, project))
    }

    /// The reading `id` with its measurement and project when the caller
    /// owns the project.
    pub(crate) async fn owned_reading(
        &self,
        caller: &CallerIdentity,
        id: ReadingId,
    ) -> Result<(DivisionReading, Measurement, Project), Error> {
        let not_found = || Error::not_found(format!("reading {id} not found"));
        let reading = self
            .readings
            .find_by_id(id)
            .await
            .map_err(map_reading_error)?
            .ok_or_else(not_found)?;
        let measurement = self
            .measurements
            .find_by_id(reading.medicion_id)
            .await
            .map_err(map_measurement_error)?
            .ok_or_else(not_found)?;
        let project = self
            .find_owned_project(caller, measurement.proyecto_id)
            .await?
            .ok_or_else(not_found)?;
        Ok((reading, measurement, project))
    }
}

pub(crate) fn map_profile_error(error: UserProfileRepositoryError) -> Error {
    match error {
        UserProfileRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user profile repository unavailable: {message}"))
        }
        UserProfileRepositoryError::Query { message } => {
            Error::internal(format!("user profile repository error: {message}"))
        }
        UserProfileRepositoryError::DuplicateEmail { email } => {
            Error::conflict(format!("a profile already exists for {email}"))
                .with_details(json!({ "field": "email", "code": "duplicate_email" }))
        }
        UserProfileRepositoryError::DuplicateId { id } => {
            Error::conflict(format!("a profile already exists for user {id}"))
                .with_details(json!({ "field": "id", "code": "duplicate_id" }))
        }
        UserProfileRepositoryError::Missing { id } => {
            Error::not_found(format!("user {id} not found"))
        }
    }
}

pub(crate) fn map_project_error(error: ProjectRepositoryError) -> Error {
    match error {
        ProjectRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("project repository unavailable: {message}"))
        }
        ProjectRepositoryError::Query { message } => {
            Error::internal(format!("project repository error: {message}"))
        }
        ProjectRepositoryError::Missing { id } => {
            Error::not_found(format!("project {id} not found"))
        }
    }
}

pub(crate) fn map_station_error(error: StationRepositoryError) -> Error {
    match error {
        StationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("station repository unavailable: {message}"))
        }
        StationRepositoryError::Query { message } => {
            Error::internal(format!("station repository error: {message}"))
        }
        StationRepositoryError::DuplicateKm { km } => {
            Error::conflict(format!("a station already exists at km {km}")).with_details(json!({
                "field": "km",
                "code": "duplicate_station",
                "value": km,
            }))
        }
        StationRepositoryError::Missing { id } => {
            Error::not_found(format!("station {id} not found"))
        }
    }
}

pub(crate) fn map_measurement_error(error: MeasurementRepositoryError) -> Error {
    match error {
        MeasurementRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("measurement repository unavailable: {message}"))
        }
        MeasurementRepositoryError::Query { message } => {
            Error::internal(format!("measurement repository error: {message}"))
        }
        MeasurementRepositoryError::DuplicateKm { km } => Error::conflict(format!(
            "a measurement already exists at station km {km}"
        ))
        .with_details(json!({
            "field": "estacion_km",
            "code": "duplicate_measurement",
            "value": km,
        })),
        MeasurementRepositoryError::Missing { id } => {
            Error::not_found(format!("measurement {id} not found"))
        }
    }
}

pub(crate) fn map_reading_error(error: ReadingRepositoryError) -> Error {
    match error {
        ReadingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("reading repository unavailable: {message}"))
        }
        ReadingRepositoryError::Query { message } => {
            Error::internal(format!("reading repository error: {message}"))
        }
        ReadingRepositoryError::DuplicateDivision { division } => Error::conflict(format!(
            "a reading already exists at division {division}"
        ))
        .with_details(json!({
            "field": "division_transversal",
            "code": "duplicate_reading",
            "value": division,
        })),
        ReadingRepositoryError::Missing { id } => {
            Error::not_found(format!("reading {id} not found"))
        }
    }
}
